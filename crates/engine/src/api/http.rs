//! HTTP routes.
//!
//! Thin mapping of the lifecycle use cases onto REST endpoints. Every call
//! carries a [`RequestContext`] built from the request headers (and, for the
//! batch endpoint, the raw body).

use axum::{
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dismissible_domain::{DismissibleItem, DomainError, ItemId, RequestContext, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::app::App;
use crate::entities::{GetOrCreateOutcome, ItemError, ItemTransition};
use crate::infrastructure::ports::FieldError;
use crate::use_cases::lifecycle::LifecycleError;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/v1/users/{user_id}/items", post(batch_get_or_create))
        .route(
            "/v1/users/{user_id}/items/{item_id}",
            get(get_or_create).delete(dismiss).post(restore),
        )
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Request / response bodies
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub data: DismissibleItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
}

impl From<GetOrCreateOutcome> for ItemResponse {
    fn from(outcome: GetOrCreateOutcome) -> Self {
        Self {
            data: outcome.item,
            created: Some(outcome.created),
        }
    }
}

impl From<ItemTransition> for ItemResponse {
    fn from(transition: ItemTransition) -> Self {
        Self {
            data: transition.item,
            created: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub data: Vec<ItemResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    pub item_ids: Vec<String>,
}

// =============================================================================
// Handlers
// =============================================================================

async fn get_or_create(
    State(app): State<Arc<App>>,
    Path((user_id, item_id)): Path<(String, String)>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Json<ItemResponse>, ApiError> {
    let (item_id, user_id) = parse_ids(&item_id, &user_id)?;
    let outcome = app
        .use_cases
        .lifecycle
        .get_or_create
        .execute(item_id, user_id, Some(request_context(&headers, query)))
        .await?;
    Ok(Json(outcome.into()))
}

async fn dismiss(
    State(app): State<Arc<App>>,
    Path((user_id, item_id)): Path<(String, String)>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Json<ItemResponse>, ApiError> {
    let (item_id, user_id) = parse_ids(&item_id, &user_id)?;
    let transition = app
        .use_cases
        .lifecycle
        .dismiss
        .execute(item_id, user_id, Some(request_context(&headers, query)))
        .await?;
    Ok(Json(transition.into()))
}

async fn restore(
    State(app): State<Arc<App>>,
    Path((user_id, item_id)): Path<(String, String)>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Result<Json<ItemResponse>, ApiError> {
    let (item_id, user_id) = parse_ids(&item_id, &user_id)?;
    let transition = app
        .use_cases
        .lifecycle
        .restore
        .execute(item_id, user_id, Some(request_context(&headers, query)))
        .await?;
    Ok(Json(transition.into()))
}

async fn batch_get_or_create(
    State(app): State<Arc<App>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    raw_body: String,
) -> Result<Json<BatchResponse>, ApiError> {
    let user_id = UserId::new(user_id)?;
    let request: BatchRequest = serde_json::from_str(&raw_body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?;
    let item_ids = request
        .item_ids
        .into_iter()
        .map(ItemId::new)
        .collect::<Result<Vec<_>, _>>()?;

    let outcomes = app
        .use_cases
        .lifecycle
        .batch_get_or_create
        .execute(
            item_ids,
            user_id,
            Some(request_context(&headers, query).with_body(raw_body)),
        )
        .await?;

    Ok(Json(BatchResponse {
        data: outcomes.into_iter().map(ItemResponse::from).collect(),
    }))
}

fn parse_ids(item_id: &str, user_id: &str) -> Result<(ItemId, UserId), ApiError> {
    Ok((ItemId::new(item_id)?, UserId::new(user_id)?))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Build the per-call context from request metadata.
///
/// The client address is the first `x-forwarded-for` entry, else `x-real-ip`.
/// Repeated headers are joined with `", "`.
pub fn request_context(headers: &HeaderMap, query: Option<String>) -> RequestContext {
    let request_id = header_str(headers, "x-request-id")
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut context = RequestContext::new(request_id);
    for name in headers.keys() {
        let values: Vec<&str> = headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        if !values.is_empty() {
            context = context.with_header(name.as_str(), values.join(", "));
        }
    }

    context.ip = header_str(headers, "x-forwarded-for")
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .or_else(|| header_str(headers, "x-real-ip"))
        .map(str::to_string);
    context.origin = header_str(headers, "origin").map(str::to_string);
    context.referer = header_str(headers, "referer").map(str::to_string);
    context.user_agent = header_str(headers, "user-agent").map(str::to_string);
    context.query = query.filter(|q| !q.is_empty());
    context
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    Validation(Vec<FieldError>),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Forbidden(reason) => (
                StatusCode::FORBIDDEN,
                Json(serde_json::json!({ "error": reason })),
            )
                .into_response(),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": msg })),
            )
                .into_response(),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": msg })),
            )
                .into_response(),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "Validation failed", "details": errors })),
            )
                .into_response(),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "Internal error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<LifecycleError> for ApiError {
    fn from(e: LifecycleError) -> Self {
        match e {
            LifecycleError::Forbidden { reason } => ApiError::Forbidden(reason),
            LifecycleError::Item(ItemError::NotFound { item_id }) => {
                ApiError::NotFound(format!("Item {item_id} not found"))
            }
            LifecycleError::Item(ItemError::Validation(errors)) => ApiError::Validation(errors),
            LifecycleError::Item(e @ ItemError::Repo(_)) => ApiError::Internal(e.to_string()),
            LifecycleError::Item(e) => ApiError::BadRequest(e.to_string()),
            LifecycleError::Hook(e) => ApiError::Internal(format!("{e:#}")),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}
