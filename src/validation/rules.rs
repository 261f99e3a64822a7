//! Per-type rule table
//!
//! Each [`FieldType`] maps to a [`FieldBehavior`]: the default value of a
//! fresh input and the builder of its type check. The `match` in
//! [`behavior`] is exhaustive, so adding a field type fails to compile until
//! both are provided.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde_json::Value;

use super::messages::Message;
use super::ValidationOptions;
use crate::error::{FormError, Result};
use crate::field::{Field, FieldType};
use crate::values::{number_value, to_number};

/// Phone shape used when a phone field declares no pattern: optional
/// country code followed by ten digits.
pub const DEFAULT_PHONE_PATTERN: &str = r"^(\+\d{1,3}[- ]?)?\d{10}$";

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+'\-]+@([A-Za-z0-9]([A-Za-z0-9\-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Default value and check builder of a field type
#[derive(Clone, Copy)]
pub(crate) struct FieldBehavior {
    pub default_value: fn() -> Value,
    pub build_check: fn(&Field, &ValidationOptions) -> Result<Check>,
}

pub(crate) fn behavior(field_type: FieldType) -> FieldBehavior {
    match field_type {
        FieldType::Text | FieldType::Textarea => FieldBehavior {
            default_value: empty_string,
            build_check: text_check,
        },
        FieldType::Email => FieldBehavior {
            default_value: empty_string,
            build_check: |field, _| Ok(Check::Email { max_len: field.max() }),
        },
        FieldType::Number => FieldBehavior {
            default_value: || Value::Null,
            build_check: |field, _| {
                Ok(Check::Number {
                    min: field.min(),
                    max: field.max(),
                })
            },
        },
        FieldType::Checkbox => FieldBehavior {
            default_value: || Value::Bool(false),
            build_check: |_, _| Ok(Check::Boolean),
        },
        FieldType::Select | FieldType::Radio => FieldBehavior {
            default_value: empty_string,
            build_check: |field, options| {
                let allowed = options
                    .enforce_option_membership
                    .then(|| field.options.iter().map(|o| o.value.clone()).collect());
                Ok(Check::Choice { allowed })
            },
        },
        FieldType::Date => FieldBehavior {
            default_value: empty_string,
            build_check: |_, _| Ok(Check::Date),
        },
        FieldType::Phone => FieldBehavior {
            default_value: empty_string,
            build_check: phone_check,
        },
        FieldType::Url => FieldBehavior {
            default_value: empty_string,
            build_check: |_, _| Ok(Check::Url),
        },
    }
}

fn empty_string() -> Value {
    Value::String(String::new())
}

fn compile(field: &Field, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| FormError::InvalidPattern {
        field: field.id.clone(),
        source,
    })
}

fn text_check(field: &Field, _: &ValidationOptions) -> Result<Check> {
    let pattern = field.pattern().map(|p| compile(field, p)).transpose()?;
    Ok(Check::Text {
        min_len: field.min(),
        max_len: field.max(),
        pattern,
    })
}

fn phone_check(field: &Field, options: &ValidationOptions) -> Result<Check> {
    let pattern = field.pattern().unwrap_or(&options.phone_pattern);
    Ok(Check::Phone {
        pattern: compile(field, pattern)?,
    })
}

/// Type-specific check applied to a non-empty value
#[derive(Debug, Clone)]
pub(crate) enum Check {
    Text {
        min_len: Option<f64>,
        max_len: Option<f64>,
        pattern: Option<Regex>,
    },
    Email {
        max_len: Option<f64>,
    },
    Number {
        min: Option<f64>,
        max: Option<f64>,
    },
    Boolean,
    /// `allowed` is set only when option membership is enforced
    Choice {
        allowed: Option<Vec<String>>,
    },
    Date,
    Phone {
        pattern: Regex,
    },
    Url,
}

impl Check {
    /// Check a value, returning it coerced to the field's output type
    pub fn apply(&self, value: &Value) -> std::result::Result<Value, Message> {
        match self {
            Check::Text { min_len, max_len, pattern } => {
                let s = expect_str(value)?;
                check_length(s, *min_len, *max_len)?;
                if let Some(re) = pattern {
                    if !re.is_match(s) {
                        return Err(Message::PatternMismatch);
                    }
                }
                Ok(value.clone())
            }
            Check::Email { max_len } => {
                let s = expect_str(value)?;
                if !EMAIL.is_match(s) {
                    return Err(Message::InvalidEmail);
                }
                check_length(s, None, *max_len)?;
                Ok(value.clone())
            }
            Check::Number { min, max } => {
                let n = to_number(Some(value)).ok_or(Message::NotANumber)?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(Message::TooSmall(*min));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(Message::TooLarge(*max));
                    }
                }
                Ok(number_value(n))
            }
            Check::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                _ => Err(Message::ExpectedBoolean),
            },
            Check::Choice { allowed } => {
                let s = expect_str(value)?;
                match allowed {
                    Some(allowed) if !allowed.iter().any(|v| v == s) => Err(Message::InvalidOption),
                    _ => Ok(value.clone()),
                }
            }
            Check::Date => {
                let s = expect_str(value)?;
                if is_date(s) {
                    Ok(value.clone())
                } else {
                    Err(Message::InvalidDate)
                }
            }
            Check::Phone { pattern } => {
                let s = expect_str(value)?;
                if pattern.is_match(s) {
                    Ok(value.clone())
                } else {
                    Err(Message::InvalidPhone)
                }
            }
            Check::Url => {
                let s = expect_str(value)?;
                url::Url::parse(s).map_err(|_| Message::InvalidUrl)?;
                Ok(value.clone())
            }
        }
    }
}

fn expect_str(value: &Value) -> std::result::Result<&str, Message> {
    value.as_str().ok_or(Message::ExpectedString)
}

fn check_length(s: &str, min: Option<f64>, max: Option<f64>) -> std::result::Result<(), Message> {
    let len = s.chars().count() as f64;
    if let Some(min) = min {
        if len < min {
            return Err(Message::TooShort(min));
        }
    }
    if let Some(max) = max {
        if len > max {
            return Err(Message::TooLong(max));
        }
    }
    Ok(())
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM[:SS]` and RFC 3339 timestamps
fn is_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").is_ok()
        || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
        || DateTime::parse_from_rfc3339(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldValidation;
    use serde_json::json;

    fn check_for(field: &Field) -> Check {
        (behavior(field.field_type).build_check)(field, &ValidationOptions::default()).unwrap()
    }

    #[test]
    fn test_every_type_has_a_default() {
        for ty in FieldType::ALL {
            let default = (behavior(ty).default_value)();
            match ty {
                FieldType::Checkbox => assert_eq!(default, json!(false)),
                FieldType::Number => assert_eq!(default, Value::Null),
                _ => assert_eq!(default, json!("")),
            }
        }
    }

    #[test]
    fn test_email() {
        let check = check_for(&Field::new("e", FieldType::Email, "E-posta"));
        assert!(check.apply(&json!("ali@example.com")).is_ok());
        assert_eq!(check.apply(&json!("not-an-email")), Err(Message::InvalidEmail));
        assert_eq!(check.apply(&json!(12)), Err(Message::ExpectedString));
    }

    #[test]
    fn test_number_coercion_and_bounds() {
        let field = Field::new("n", FieldType::Number, "Yaş").with_validation(FieldValidation {
            min: Some(18.0),
            max: Some(99.0),
            pattern: None,
        });
        let check = check_for(&field);
        assert_eq!(check.apply(&json!("42")), Ok(json!(42)));
        assert_eq!(check.apply(&json!(17)), Err(Message::TooSmall(18.0)));
        assert_eq!(check.apply(&json!(100)), Err(Message::TooLarge(99.0)));
        assert_eq!(check.apply(&json!("abc")), Err(Message::NotANumber));
    }

    #[test]
    fn test_phone_default_pattern() {
        let check = check_for(&Field::new("p", FieldType::Phone, "Telefon"));
        assert!(check.apply(&json!("5551234567")).is_ok());
        assert!(check.apply(&json!("+90 5551234567")).is_ok());
        assert!(check.apply(&json!("+905551234567")).is_ok());
        assert_eq!(check.apply(&json!("12345")), Err(Message::InvalidPhone));
    }

    #[test]
    fn test_phone_custom_pattern() {
        let field = Field::new("p", FieldType::Phone, "Telefon").with_validation(FieldValidation {
            pattern: Some(r"^\d{3}-\d{4}$".to_string()),
            ..Default::default()
        });
        let check = check_for(&field);
        assert!(check.apply(&json!("555-1234")).is_ok());
        assert!(check.apply(&json!("5551234567")).is_err());
    }

    #[test]
    fn test_invalid_pattern_fails_at_build() {
        let field = Field::new("t", FieldType::Text, "T").with_validation(FieldValidation {
            pattern: Some("([a-z".to_string()),
            ..Default::default()
        });
        let result = (behavior(FieldType::Text).build_check)(&field, &ValidationOptions::default());
        assert!(matches!(result, Err(FormError::InvalidPattern { .. })));
    }

    #[test]
    fn test_date() {
        let check = check_for(&Field::new("d", FieldType::Date, "Tarih"));
        assert!(check.apply(&json!("2024-02-29")).is_ok());
        assert!(check.apply(&json!("2024-05-01T10:30")).is_ok());
        assert!(check.apply(&json!("2024-05-01T10:30:00Z")).is_ok());
        assert_eq!(check.apply(&json!("2023-02-29")), Err(Message::InvalidDate));
        assert_eq!(check.apply(&json!("yarın")), Err(Message::InvalidDate));
    }

    #[test]
    fn test_url() {
        let check = check_for(&Field::new("u", FieldType::Url, "Web sitesi"));
        assert!(check.apply(&json!("https://example.com/a?b=c")).is_ok());
        assert_eq!(check.apply(&json!("example")), Err(Message::InvalidUrl));
    }

    #[test]
    fn test_text_length_and_pattern() {
        let field = Field::new("t", FieldType::Text, "Kod").with_validation(FieldValidation {
            min: Some(2.0),
            max: Some(4.0),
            pattern: Some("^[A-Z]+$".to_string()),
        });
        let check = check_for(&field);
        assert!(check.apply(&json!("ABC")).is_ok());
        assert_eq!(check.apply(&json!("A")), Err(Message::TooShort(2.0)));
        assert_eq!(check.apply(&json!("ABCDE")), Err(Message::TooLong(4.0)));
        assert_eq!(check.apply(&json!("abc")), Err(Message::PatternMismatch));
    }

    #[test]
    fn test_pattern_is_searched_not_anchored() {
        let field = Field::new("t", FieldType::Text, "Kod").with_validation(FieldValidation {
            pattern: Some("^[A-Z]+".to_string()),
            ..Default::default()
        });
        let check = check_for(&field);
        assert!(check.apply(&json!("ABc")).is_ok());
        assert_eq!(check.apply(&json!("aBC")), Err(Message::PatternMismatch));
    }
}
