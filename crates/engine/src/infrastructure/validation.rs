//! Item shape validation backed by the `validator` crate.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use dismissible_domain::DismissibleItem;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::infrastructure::ports::{FieldError, ItemValidator};

/// Persisted shape of an item, checked before every write.
#[derive(Debug, Validate)]
#[validate(schema(function = "validate_dismissal_order", skip_on_field_errors = false))]
struct ItemRecord {
    #[validate(length(min = 1, max = 64, message = "must be 1 to 64 characters"))]
    id: String,
    #[validate(length(min = 1, max = 64, message = "must be 1 to 64 characters"))]
    user_id: String,
    created_at: DateTime<Utc>,
    dismissed_at: Option<DateTime<Utc>>,
}

impl From<&DismissibleItem> for ItemRecord {
    fn from(item: &DismissibleItem) -> Self {
        Self {
            id: item.id().to_string(),
            user_id: item.user_id().to_string(),
            created_at: item.created_at(),
            dismissed_at: item.dismissed_at(),
        }
    }
}

fn validate_dismissal_order(record: &ItemRecord) -> Result<(), ValidationError> {
    match record.dismissed_at {
        Some(dismissed_at) if dismissed_at < record.created_at => {
            let mut err = ValidationError::new("dismissed_before_created");
            err.message = Some(Cow::Borrowed("dismissedAt cannot be earlier than createdAt"));
            Err(err)
        }
        _ => Ok(()),
    }
}

fn field_name(raw: &str) -> String {
    match raw {
        "user_id" => "userId".to_string(),
        "__all__" => "item".to_string(),
        other => other.to_string(),
    }
}

fn to_field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field_name(&field.to_string());
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                FieldError::new(field.clone(), message)
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

/// [`ItemValidator`] using `validator` derive rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValidatorItemValidator;

impl ValidatorItemValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ItemValidator for ValidatorItemValidator {
    fn validate(&self, item: &DismissibleItem) -> Result<(), Vec<FieldError>> {
        ItemRecord::from(item)
            .validate()
            .map_err(|errors| to_field_errors(&errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use dismissible_domain::{ItemId, UserId, MAX_ID_LENGTH};

    fn ids() -> (ItemId, UserId) {
        (ItemId::new("banner").unwrap(), UserId::new("u1").unwrap())
    }

    #[test]
    fn active_item_is_valid() {
        let (id, user) = ids();
        let item = DismissibleItem::new(id, user, Utc::now());
        assert!(ValidatorItemValidator.validate(&item).is_ok());
    }

    #[test]
    fn dismissal_before_creation_is_rejected() {
        let (id, user) = ids();
        let created = Utc::now();
        let item =
            DismissibleItem::from_parts(id, user, created, Some(created - Duration::seconds(5)));

        let errors = ValidatorItemValidator.validate(&item).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "item");
        assert!(errors[0].message.contains("dismissedAt"));
    }

    #[test]
    fn dismissal_at_creation_instant_is_valid() {
        let (id, user) = ids();
        let created = Utc::now();
        let item = DismissibleItem::from_parts(id, user, created, Some(created));
        assert!(ValidatorItemValidator.validate(&item).is_ok());
    }

    #[test]
    fn length_rule_matches_domain_bound() {
        let record = ItemRecord {
            id: "a".repeat(MAX_ID_LENGTH + 1),
            user_id: "u".to_string(),
            created_at: Utc::now(),
            dismissed_at: None,
        };
        let errors = to_field_errors(&record.validate().unwrap_err());
        assert_eq!(errors, vec![FieldError::new("id", "must be 1 to 64 characters")]);
    }
}
