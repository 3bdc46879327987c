//! Reminder domain types and payload validation

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;

use crate::validation::MAX_IDENTIFIER;
use crate::validation::ValidationError;
use crate::validation::parse_datetime;
use crate::validation::validate_enum;
use crate::validation::validate_id;

/// The displayable projection of a reminder
///
/// This is the only reminder shape that leaves the storage boundary; the
/// soft-delete flag and account linkage never do
#[derive(Clone, Debug)]
pub struct Reminder {
    pub id: i64,
    pub description: String,
    pub customer_id: Option<i64>,
    pub datetime: NaiveDateTime,
    pub is_done: bool,
}

/// Raw reminder payload, as sent by a client
///
/// Fields are loose on purpose: validation collects every violation in one
/// pass instead of failing on the first malformed field. The account id is
/// never part of the payload; it comes from the authenticated caller.
#[derive(Debug, Default, Deserialize)]
pub struct ReminderForm {
    pub description: Option<String>,
    pub datetime: Option<String>,
    pub is_done: Option<Value>,
    pub customer_id: Option<Value>,
}

/// A fully-specified, validated reminder, ready to persist
///
/// Immutable by construction; `validate` is the only way to build one
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReminderDraft {
    pub description: String,
    pub datetime: NaiveDateTime,
    pub is_done: bool,
    pub customer_id: Option<i64>,
    pub account_id: i64,
}

/// Maximum length of a reminder description
const MAX_DESCRIPTION_LENGTH: usize = 2047;

impl ReminderForm {
    /// Validate the payload against the reminder schema
    ///
    /// Runs in non-short-circuit mode: the returned error carries one detail
    /// per violated field
    ///
    /// # Errors
    ///
    /// Will return `Err` when any field is missing, malformed or out of range
    pub fn validate(&self, account_id: i64) -> Result<ReminderDraft, ValidationError> {
        let mut errors = ValidationError::new();

        let description = match &self.description {
            Some(description)
                if !description.is_empty()
                    && description.chars().count() <= MAX_DESCRIPTION_LENGTH =>
            {
                Some(description.clone())
            }
            Some(_) => {
                errors.push(
                    "description",
                    format!(
                        "\"description\" must be between 1 and {MAX_DESCRIPTION_LENGTH} characters"
                    ),
                );
                None
            }
            None => {
                errors.push("description", "\"description\" is required");
                None
            }
        };

        let datetime = match &self.datetime {
            Some(datetime) => {
                let parsed = parse_datetime(datetime);
                if parsed.is_none() {
                    errors.push("datetime", "\"datetime\" must be a valid datetime");
                }
                parsed
            }
            None => {
                errors.push("datetime", "\"datetime\" is required");
                None
            }
        };

        let is_done = match &self.is_done {
            Some(value) => {
                let normalized = normalize_done_flag(value);
                if normalized.is_none() {
                    errors.push("is_done", "\"is_done\" must be a boolean or one of [1, 0]");
                }
                normalized
            }
            None => {
                errors.push("is_done", "\"is_done\" is required");
                None
            }
        };

        let customer_id = match &self.customer_id {
            None | Some(Value::Null) => None,
            Some(value) => match value.as_i64().map(|id| validate_id("customer_id", id)) {
                Some(Ok(id)) => Some(id),
                _ => {
                    errors.push(
                        "customer_id",
                        format!(
                            "\"customer_id\" must be a positive integer no greater than {MAX_IDENTIFIER}"
                        ),
                    );
                    None
                }
            },
        };

        if let Err(error) = validate_id("account_id", account_id) {
            errors.absorb(error);
        }

        errors.into_result()?;

        Ok(ReminderDraft {
            description: description.expect("validated description"),
            datetime: datetime.expect("validated datetime"),
            is_done: is_done.expect("validated is_done"),
            customer_id,
            account_id,
        })
    }
}

/// Normalize the completion flag to a strict boolean
///
/// Accepts a boolean, the numbers `1`/`0` and the strings `"1"`/`"0"`
fn normalize_done_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(done) => Some(*done),
        Value::Number(number) => match number.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(literal) => validate_enum("is_done", Some(literal), &["1", "0"])
            .ok()
            .map(|literal| literal == "1"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn valid_form() -> ReminderForm {
        ReminderForm {
            description: Some("Call back".to_string()),
            datetime: Some("2024-03-01 10:00:00".to_string()),
            is_done: Some(json!(false)),
            customer_id: Some(json!(5)),
        }
    }

    #[test]
    fn test_validate_accepts_a_complete_payload() {
        let draft = valid_form().validate(1).unwrap();

        assert_eq!("Call back", draft.description);
        assert_eq!(Some(5), draft.customer_id);
        assert_eq!(1, draft.account_id);
        assert!(!draft.is_done);
    }

    #[test]
    fn test_validate_normalizes_done_flag_encodings() {
        for (encoding, expected) in [
            (json!(true), true),
            (json!(false), false),
            (json!(1), true),
            (json!(0), false),
            (json!("1"), true),
            (json!("0"), false),
        ] {
            let mut form = valid_form();
            form.is_done = Some(encoding);

            assert_eq!(expected, form.validate(1).unwrap().is_done);
        }
    }

    #[test]
    fn test_validate_rejects_unknown_done_flag_encodings() {
        for encoding in [json!("yes"), json!(2), json!(1.5), json!([1])] {
            let mut form = valid_form();
            form.is_done = Some(encoding);

            assert!(form.validate(1).is_err());
        }
    }

    #[test]
    fn test_validate_collects_all_missing_fields() {
        let error = ReminderForm::default().validate(1).unwrap_err();

        let paths = error
            .details()
            .iter()
            .map(|detail| detail.path.as_str())
            .collect::<Vec<&str>>();

        assert_eq!(vec!["description", "datetime", "is_done"], paths);
    }

    #[test]
    fn test_validate_checks_description_length() {
        let mut form = valid_form();
        form.description = Some("x".repeat(MAX_DESCRIPTION_LENGTH));
        assert!(form.validate(1).is_ok());

        let mut form = valid_form();
        form.description = Some("x".repeat(MAX_DESCRIPTION_LENGTH + 1));
        assert!(form.validate(1).is_err());

        let mut form = valid_form();
        form.description = Some(String::new());
        assert!(form.validate(1).is_err());
    }

    #[test]
    fn test_validate_checks_customer_id_range() {
        for customer_id in [json!(0), json!(-3), json!(MAX_IDENTIFIER + 1), json!("5")] {
            let mut form = valid_form();
            form.customer_id = Some(customer_id);

            let error = form.validate(1).unwrap_err();
            assert_eq!("customer_id", error.details()[0].path);
        }

        // explicit null and absent are both fine
        let mut form = valid_form();
        form.customer_id = Some(Value::Null);
        assert_eq!(None, form.validate(1).unwrap().customer_id);

        let mut form = valid_form();
        form.customer_id = None;
        assert_eq!(None, form.validate(1).unwrap().customer_id);
    }

    #[test]
    fn test_validate_rejects_out_of_range_account() {
        let error = valid_form().validate(0).unwrap_err();
        assert_eq!("account_id", error.details()[0].path);
    }
}
