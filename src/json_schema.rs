//! JSON Schema export
//!
//! Derives a draft-07 JSON Schema for a form's submitted data from its field
//! definitions, carrying UI metadata (type, placeholder, condition, layout)
//! as `x-form-*` keywords. Requiredness of conditional fields cannot be
//! expressed statically; such fields are marked `x-form-required` instead
//! of being listed in `required`.
//!
//! Every payload [`FormValidator`](crate::FormValidator) accepts under the
//! same [`ValidationOptions`] is valid against the export: optional fields
//! also admit `""`, and choices are only closed over their options when
//! membership is enforced.

use serde_json::{json, Map, Value};

use crate::defaults::default_for;
use crate::field::{Field, FieldType};
use crate::form::FormSchema;
use crate::validation::ValidationOptions;

impl FormSchema {
    /// JSON Schema describing valid submissions of this form
    pub fn to_json_schema(&self, options: &ValidationOptions) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            properties.insert(field.id.clone(), field_schema(field, options));
            if field.required && field.condition.is_none() && field.field_type != FieldType::Checkbox {
                required.push(Value::String(field.id.clone()));
            }
        }

        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "title": self.name,
            "type": "object",
            "properties": properties,
            "required": required,
            "x-form-id": self.id,
            "x-form-layout": self.layout,
            "x-form-version": self.version.to_string(),
        })
    }
}

fn field_schema(field: &Field, options: &ValidationOptions) -> Value {
    let rule = value_rule(field, options);

    // optional fields keep an empty string as submitted
    let mut schema = if field.required || field.field_type == FieldType::Checkbox {
        rule
    } else {
        let mut schema = Map::new();
        schema.insert("anyOf".to_string(), json!([{ "const": "" }, Value::Object(rule)]));
        schema
    };
    let mut set = |key: &str, value: Value| {
        schema.insert(key.to_string(), value);
    };

    set("title", json!(field.label));
    if let Some(help) = &field.help_text {
        set("description", json!(help));
    }
    let default = default_for(field.field_type);
    if !default.is_null() {
        set("default", default);
    }
    set("x-form-type", json!(field.field_type));
    if let Some(placeholder) = &field.placeholder {
        set("x-form-placeholder", json!(placeholder));
    }
    if let Some(condition) = &field.condition {
        set("x-form-condition", json!(condition));
        if field.required {
            set("x-form-required", json!(true));
        }
    }

    Value::Object(schema)
}

/// Keywords a non-empty value of the field must satisfy
fn value_rule(field: &Field, options: &ValidationOptions) -> Map<String, Value> {
    let mut schema = Map::new();
    let mut set = |key: &str, value: Value| {
        schema.insert(key.to_string(), value);
    };

    match field.field_type {
        FieldType::Text | FieldType::Textarea => {
            set("type", json!("string"));
            if let Some(min) = field.min() {
                set("minLength", json!(min.max(0.0) as u64));
            }
            if let Some(max) = field.max() {
                set("maxLength", json!(max.max(0.0) as u64));
            }
            if let Some(pattern) = field.pattern() {
                set("pattern", json!(pattern));
            }
        }
        FieldType::Email => {
            set("type", json!("string"));
            set("format", json!("email"));
            if let Some(max) = field.max() {
                set("maxLength", json!(max.max(0.0) as u64));
            }
        }
        FieldType::Number => {
            set("type", json!("number"));
            if let Some(min) = field.min() {
                set("minimum", json!(min));
            }
            if let Some(max) = field.max() {
                set("maximum", json!(max));
            }
        }
        FieldType::Checkbox => set("type", json!("boolean")),
        FieldType::Select | FieldType::Radio => {
            set("type", json!("string"));
            if options.enforce_option_membership {
                let choices: Vec<Value> = field
                    .options
                    .iter()
                    .map(|o| json!({ "const": o.value, "title": o.label }))
                    .collect();
                if choices.is_empty() {
                    // no option can be selected
                    set("not", json!({}));
                } else {
                    // duplicate option values must still match
                    set("anyOf", Value::Array(choices));
                }
            }
        }
        FieldType::Date => {
            set("type", json!("string"));
            // date or date-time, both start with the calendar date
            set("pattern", json!(r"^\d{4}-\d{2}-\d{2}"));
        }
        FieldType::Phone => {
            set("type", json!("string"));
            let pattern = field.pattern().unwrap_or(options.phone_pattern.as_str());
            set("pattern", json!(pattern));
        }
        FieldType::Url => {
            set("type", json!("string"));
            set("format", json!("uri"));
        }
    }

    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormsConfig;
    use crate::field::{Condition, ConditionOperator, FieldOption, FieldValidation};
    use crate::session::FormSession;
    use crate::validation::FormValidator;
    use jsonschema::JSONSchema;

    fn schema() -> FormSchema {
        FormSchema::new(
            "newsletter",
            "Bülten",
            vec![
                Field::new("email", FieldType::Email, "E-posta").required(),
                Field::new("age", FieldType::Number, "Yaş").with_validation(FieldValidation {
                    min: Some(18.0),
                    ..Default::default()
                }),
                Field::new("topic", FieldType::Select, "Konu")
                    .with_options([FieldOption::new("Haberler", "news"), FieldOption::new("Etkinlik", "events")]),
                Field::new("other", FieldType::Text, "Diğer")
                    .required()
                    .with_condition(Condition::new("topic", ConditionOperator::Equals, "other")),
            ],
        )
    }

    fn compile(exported: &Value) -> JSONSchema {
        JSONSchema::compile(exported).unwrap()
    }

    #[test]
    fn test_export_shape() {
        let exported = schema().to_json_schema(&ValidationOptions::default());
        assert_eq!(exported["$schema"], json!("http://json-schema.org/draft-07/schema#"));
        assert_eq!(exported["title"], json!("Bülten"));
        assert_eq!(exported["required"], json!(["email"]));
        assert_eq!(exported["properties"]["email"]["format"], json!("email"));
        assert_eq!(exported["properties"]["age"]["anyOf"][0], json!({"const": ""}));
        assert_eq!(exported["properties"]["age"]["anyOf"][1]["minimum"], json!(18.0));
        assert_eq!(exported["properties"]["age"]["title"], json!("Yaş"));
        assert_eq!(exported["properties"]["topic"]["anyOf"][1], json!({"type": "string"}));
        assert_eq!(exported["properties"]["other"]["x-form-required"], json!(true));
        assert_eq!(exported["properties"]["other"]["x-form-condition"]["operator"], json!("EQUALS"));
        assert_eq!(exported["x-form-layout"], json!("vertical"));
    }

    #[test]
    fn test_export_accepts_session_payloads() {
        let options = ValidationOptions::default();
        let mut session = FormSession::new(schema(), None, &FormsConfig::default()).unwrap();
        session.set_value("email", "a@b.co").unwrap();
        let payload = session.validate().unwrap();
        assert_eq!(payload["topic"], json!(""));

        let compiled = compile(&schema().to_json_schema(&options));
        assert!(compiled.is_valid(&Value::Object(payload)));

        // membership is not enforced, so any topic is accepted
        assert!(compiled.is_valid(&json!({"email": "a@b.co", "age": "", "topic": "sports"})));
        assert!(compiled.is_valid(&json!({"email": "a@b.co", "age": 30, "topic": "news"})));
        assert!(!compiled.is_valid(&json!({"email": "a@b.co", "age": 12})));
        assert!(!compiled.is_valid(&json!({"age": 30})));
    }

    #[test]
    fn test_export_enforces_membership_when_configured() {
        let options = ValidationOptions {
            enforce_option_membership: true,
            ..Default::default()
        };
        let exported = schema().to_json_schema(&options);
        assert_eq!(exported["properties"]["topic"]["anyOf"][1]["anyOf"][1]["const"], json!("events"));

        let compiled = compile(&exported);
        let validator = FormValidator::build(&schema().fields, None, &options).unwrap();
        for (topic, accepted) in [("news", true), ("", true), ("sports", false)] {
            let values = json!({"email": "a@b.co", "topic": topic});
            assert_eq!(compiled.is_valid(&values), accepted, "topic {:?}", topic);
            let Value::Object(values) = values else { unreachable!() };
            assert_eq!(validator.validate(&values).is_ok(), accepted, "topic {:?}", topic);
        }
    }
}
