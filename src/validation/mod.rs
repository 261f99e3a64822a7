//! Validation schema generation
//!
//! [`FormValidator`] is the composite validator for a field set. It is built
//! once from the [`Field`] definitions, compiling every pattern up front, and
//! can be re-derived for a new visible-field set without recompiling.

pub mod messages;
pub(crate) mod rules;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::condition::VisibleFields;
use crate::error::Result;
use crate::field::{Field, FieldType};
use crate::values::{is_empty, FormValues};

pub use messages::{Locale, Message};
pub use rules::DEFAULT_PHONE_PATTERN;
use rules::{behavior, Check};

/// Knobs affecting how rules are generated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Language of error messages
    #[serde(default)]
    pub locale: Locale,

    /// Reject select/radio values that are not one of the declared options
    #[serde(default)]
    pub enforce_option_membership: bool,

    /// Pattern for phone fields that declare none
    #[serde(default = "default_phone_pattern")]
    pub phone_pattern: String,
}

fn default_phone_pattern() -> String {
    DEFAULT_PHONE_PATTERN.to_string()
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            enforce_option_membership: false,
            phone_pattern: default_phone_pattern(),
        }
    }
}

/// How strictly a field is validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Must hold a non-empty value (checkboxes: a boolean)
    Required,
    /// Empty values pass; non-empty values are checked
    Optional,
    /// Outside the visible set: not checked at all
    Hidden,
}

/// Compiled rule for one field
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field_id: String,
    pub label: String,
    pub field_type: FieldType,
    required: bool,
    pub presence: Presence,
    check: Check,
}

impl FieldRule {
    fn build(field: &Field, visible: Option<&VisibleFields>, options: &ValidationOptions) -> Result<Self> {
        let check = (behavior(field.field_type).build_check)(field, options)?;
        Ok(Self {
            field_id: field.id.clone(),
            label: field.label.clone(),
            field_type: field.field_type,
            required: field.required,
            presence: presence(&field.id, field.required, visible),
            check,
        })
    }

    /// Validate one value, returning the coerced value to keep (if any)
    fn validate(&self, value: Option<&Value>) -> std::result::Result<Option<Value>, Message> {
        if self.presence == Presence::Hidden {
            return Ok(value.cloned());
        }

        if is_empty(value) {
            return match (self.presence, self.field_type) {
                (Presence::Required, FieldType::Checkbox) => Err(Message::ExpectedBoolean),
                (Presence::Required, _) => Err(Message::Required),
                // keep "" but drop absent/null
                _ => Ok(value.filter(|v| v.is_string()).cloned()),
            };
        }

        match value {
            Some(v) => self.check.apply(v).map(Some),
            None => Ok(None),
        }
    }
}

fn presence(id: &str, required: bool, visible: Option<&VisibleFields>) -> Presence {
    match visible {
        Some(visible) if !visible.contains(id) => Presence::Hidden,
        _ if required => Presence::Required,
        _ => Presence::Optional,
    }
}

/// A single field failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field_id: String,
    pub message: String,
}

/// All field failures of one validation run, in field order
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Message for a field, if it failed
    pub fn message_for(&self, field_id: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field_id == field_id)
            .map(|e| e.message.as_str())
    }

    /// Field id → message map for display next to each input
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .map(|e| (e.field_id.clone(), e.message.clone()))
            .collect()
    }
}

/// Composite validator for a whole field set
#[derive(Debug, Clone)]
pub struct FormValidator {
    rules: Vec<FieldRule>,
    locale: Locale,
}

impl FormValidator {
    /// Build rules for `fields`.
    ///
    /// With a visible set, fields outside it are exempt regardless of
    /// `required`; without one, not-required fields are optional.
    pub fn build(fields: &[Field], visible: Option<&VisibleFields>, options: &ValidationOptions) -> Result<Self> {
        let rules = fields
            .iter()
            .map(|f| FieldRule::build(f, visible, options))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(fields = rules.len(), restricted = visible.is_some(), "built form validator");

        Ok(Self {
            rules,
            locale: options.locale,
        })
    }

    /// Same rules with presence recomputed for another visible set
    pub fn restrict_to(&self, visible: &VisibleFields) -> Self {
        let rules = self
            .rules
            .iter()
            .map(|rule| FieldRule {
                presence: presence(&rule.field_id, rule.required, Some(visible)),
                ..rule.clone()
            })
            .collect();
        Self {
            rules,
            locale: self.locale,
        }
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn rule(&self, field_id: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.field_id == field_id)
    }

    /// Validate a value map.
    ///
    /// Returns the typed values on success; keys not declared in the schema
    /// are dropped. Never panics on well-formed input.
    pub fn validate(&self, values: &FormValues) -> std::result::Result<FormValues, ValidationErrors> {
        let mut output = FormValues::new();
        let mut errors = Vec::new();

        for rule in &self.rules {
            match rule.validate(values.get(&rule.field_id)) {
                Ok(Some(value)) => {
                    output.insert(rule.field_id.clone(), value);
                }
                Ok(None) => {}
                Err(message) => errors.push(FieldError {
                    field_id: rule.field_id.clone(),
                    message: message.render(&rule.label, self.locale),
                }),
            }
        }

        if errors.is_empty() {
            Ok(output)
        } else {
            Err(ValidationErrors { errors })
        }
    }
}
