//! Per-call request metadata threaded through the lifecycle pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata about the inbound call that triggered an operation.
///
/// Created once per call and read by hooks. Only a hook mutation
/// ([`ContextPatch`]) changes it, and only the fields the patch sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    pub request_id: String,
    /// Lower-cased header names to values.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub ip: Option<String>,
    pub origin: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    /// Raw request body.
    pub body: Option<String>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Header lookup by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Shallow merge: every field set in `patch` replaces the current value.
    ///
    /// `headers` is replaced wholesale, not merged key by key. Patched header
    /// names are lower-cased so [`RequestContext::header`] still finds them.
    pub fn apply(&mut self, patch: ContextPatch) {
        let ContextPatch {
            request_id,
            headers,
            ip,
            origin,
            referer,
            user_agent,
            query,
            body,
        } = patch;

        if let Some(request_id) = request_id {
            self.request_id = request_id;
        }
        if let Some(headers) = headers {
            self.headers = headers
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect();
        }
        if let Some(ip) = ip {
            self.ip = Some(ip);
        }
        if let Some(origin) = origin {
            self.origin = Some(origin);
        }
        if let Some(referer) = referer {
            self.referer = Some(referer);
        }
        if let Some(user_agent) = user_agent {
            self.user_agent = Some(user_agent);
        }
        if let Some(query) = query {
            self.query = Some(query);
        }
        if let Some(body) = body {
            self.body = Some(body);
        }
    }
}

/// A partial override of [`RequestContext`] supplied by a hook mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextPatch {
    pub request_id: Option<String>,
    pub headers: Option<BTreeMap<String, String>>,
    pub ip: Option<String>,
    pub origin: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub query: Option<String>,
    pub body: Option<String>,
}

impl ContextPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
