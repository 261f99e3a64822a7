//! Field definitions
//!
//! A [`Field`] is the declaration of one form input. Everything the engine
//! derives (defaults, validation rules, visibility, JSON Schema export) is
//! computed from these definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Type of a form input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Number,
    Checkbox,
    Select,
    Radio,
    Date,
    Phone,
    Url,
}

impl FieldType {
    /// All field types, in declaration order
    pub const ALL: [FieldType; 10] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Email,
        FieldType::Number,
        FieldType::Checkbox,
        FieldType::Select,
        FieldType::Radio,
        FieldType::Date,
        FieldType::Phone,
        FieldType::Url,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Email => "email",
            FieldType::Number => "number",
            FieldType::Checkbox => "checkbox",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Date => "date",
            FieldType::Phone => "phone",
            FieldType::Url => "url",
        }
    }

    /// Whether the field picks its value from `options`
    pub fn is_choice(&self) -> bool {
        matches!(self, FieldType::Select | FieldType::Radio)
    }

    /// Whether `validation.min`/`max` bound the value rather than its length
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number)
    }

    /// Whether `validation.pattern` is honoured for this type
    pub fn supports_pattern(&self) -> bool {
        matches!(self, FieldType::Text | FieldType::Textarea | FieldType::Phone)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operator of a visibility condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Gt,
    Lt,
    /// Any operator string not listed above. Evaluates as "always visible".
    #[serde(other)]
    Unknown,
}

impl ConditionOperator {
    /// Whether the operator compares numerically
    pub fn is_ordering(&self) -> bool {
        matches!(self, ConditionOperator::Gt | ConditionOperator::Lt)
    }
}

/// Visibility rule: show the owning field only when another field's value
/// satisfies `operator value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Id of the field whose value is inspected
    pub field: String,
    pub operator: ConditionOperator,
    /// Comparison operand (any JSON scalar)
    #[serde(default)]
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

/// Bounds and pattern attached to a field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidation {
    /// Lower bound: numeric value for numbers, length for strings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound: numeric value for numbers, length for strings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Regular expression searched for in the value, as JSON Schema's
    /// `pattern`; anchor it with `^...$` to match the whole value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// One choice of a select or radio field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Declaration of a single form input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Unique key within the form, also the key of submitted data
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

impl Field {
    /// Create an optional, unconditional field
    pub fn new(id: impl Into<String>, field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            label: label.into(),
            required: false,
            validation: None,
            condition: None,
            options: Vec::new(),
            placeholder: None,
            help_text: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_options(mut self, options: impl IntoIterator<Item = FieldOption>) -> Self {
        self.options = options.into_iter().collect();
        self
    }

    pub fn min(&self) -> Option<f64> {
        self.validation.as_ref().and_then(|v| v.min)
    }

    pub fn max(&self) -> Option<f64> {
        self.validation.as_ref().and_then(|v| v.max)
    }

    pub fn pattern(&self) -> Option<&str> {
        self.validation.as_ref().and_then(|v| v.pattern.as_deref())
    }

    /// Id of the field this one's visibility depends on
    pub fn depends_on(&self) -> Option<&str> {
        self.condition.as_ref().map(|c| c.field.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_field() {
        let field: Field = serde_json::from_value(json!({
            "id": "phone",
            "type": "phone",
            "label": "Telefon",
            "required": true,
            "condition": { "field": "hasPhone", "operator": "EQUALS", "value": true }
        }))
        .unwrap();

        assert_eq!(field.field_type, FieldType::Phone);
        assert!(field.required);
        assert_eq!(field.depends_on(), Some("hasPhone"));
        assert_eq!(field.condition.unwrap().value, json!(true));
    }

    #[test]
    fn test_unknown_operator_is_kept() {
        let condition: Condition = serde_json::from_value(json!({
            "field": "a", "operator": "CONTAINS", "value": "x"
        }))
        .unwrap();
        assert_eq!(condition.operator, ConditionOperator::Unknown);
    }

    #[test]
    fn test_unknown_field_type_is_rejected() {
        let result = serde_json::from_value::<Field>(json!({
            "id": "a", "type": "color", "label": "Renk"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_required_defaults_to_false() {
        let field: Field = serde_json::from_value(json!({
            "id": "name", "type": "text", "label": "Ad"
        }))
        .unwrap();
        assert!(!field.required);
        assert!(field.options.is_empty());
    }
}
