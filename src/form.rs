//! Form definitions
//!
//! A [`FormSchema`] is the unit edited in the admin panel and rendered on
//! public pages. Loading goes through three gates: the raw document is
//! checked against the embedded definition schema, deserialized, then
//! checked structurally (unique ids, resolvable conditions, compilable
//! patterns).

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use jsonschema::JSONSchema;
use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dependency::DependencyGraph;
use crate::error::{FormError, Result};
use crate::field::Field;

/// JSON Schema every form definition document must satisfy
pub const DEFINITION_SCHEMA: &str = include_str!("../schemas/form-definition.schema.json");

/// How the form is laid out when rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FormLayout {
    #[default]
    Vertical,
    SinglePage,
    Horizontal,
    Grid,
}

/// A named, versioned collection of fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub id: String,
    pub name: String,
    #[serde(default = "default_version")]
    pub version: Version,
    #[serde(default)]
    pub layout: FormLayout,
    pub fields: Vec<Field>,
}

fn default_version() -> Version {
    Version::new(1, 0, 0)
}

impl FormSchema {
    /// Create a schema without checking it; see [`FormSchema::check`]
    pub fn new(id: impl Into<String>, name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: default_version(),
            layout: FormLayout::default(),
            fields,
        }
    }

    pub fn with_layout(mut self, layout: FormLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Parse and check a JSON definition
    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(content)?;
        Self::from_value(document)
    }

    /// Load and check a JSON definition file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check and deserialize a JSON definition
    pub fn from_value(document: Value) -> Result<Self> {
        check_definition(&document)?;
        let schema: FormSchema = serde_json::from_value(document)?;
        schema.check()?;

        tracing::debug!(
            form = %schema.id,
            version = %schema.version,
            fields = schema.fields.len(),
            "loaded form definition"
        );
        Ok(schema)
    }

    /// Structural checks: unique ids, conditions on other existing fields,
    /// compilable patterns
    pub fn check(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for field in &self.fields {
            if !ids.insert(field.id.as_str()) {
                return Err(FormError::DuplicateField(field.id.clone()));
            }
        }

        for field in &self.fields {
            if let Some(target) = field.depends_on() {
                if target == field.id {
                    return Err(FormError::SelfReference(field.id.clone()));
                }
                if !ids.contains(target) {
                    return Err(FormError::UnknownConditionField {
                        field: field.id.clone(),
                        target: target.to_string(),
                    });
                }
            }

            if let (true, Some(pattern)) = (field.field_type.supports_pattern(), field.pattern()) {
                Regex::new(pattern).map_err(|source| FormError::InvalidPattern {
                    field: field.id.clone(),
                    source,
                })?;
            }
        }

        Ok(())
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.id.as_str())
    }

    pub fn dependency_graph(&self) -> DependencyGraph {
        DependencyGraph::build(&self.fields)
    }
}

/// Validate a raw document against [`DEFINITION_SCHEMA`]
pub fn check_definition(document: &Value) -> Result<()> {
    let meta: Value = serde_json::from_str(DEFINITION_SCHEMA)?;
    let compiled = JSONSchema::compile(&meta).map_err(|e| FormError::InvalidDefinition(vec![e.to_string()]))?;

    let result = compiled.validate(document);
    if let Err(errors) = result {
        let messages = errors
            .map(|e| {
                let path = e.instance_path.to_string();
                let path = if path.is_empty() { "<root>".to_string() } else { path };
                format!("{}: {}", path, e)
            })
            .collect();
        return Err(FormError::InvalidDefinition(messages));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use serde_json::json;

    fn contact_form() -> Value {
        json!({
            "id": "contact",
            "name": "İletişim",
            "version": "1.2.0",
            "layout": "single_page",
            "fields": [
                { "id": "name", "type": "text", "label": "Ad Soyad", "required": true },
                { "id": "hasPhone", "type": "checkbox", "label": "Telefon ile ulaşılsın" },
                {
                    "id": "phone", "type": "phone", "label": "Telefon", "required": true,
                    "condition": { "field": "hasPhone", "operator": "EQUALS", "value": true }
                }
            ]
        })
    }

    #[test]
    fn test_load_definition() {
        let schema = FormSchema::from_value(contact_form()).unwrap();
        assert_eq!(schema.version, Version::new(1, 2, 0));
        assert_eq!(schema.layout, FormLayout::SinglePage);
        assert_eq!(schema.field_ids().collect::<Vec<_>>(), vec!["name", "hasPhone", "phone"]);
        assert_eq!(schema.field("phone").unwrap().field_type, FieldType::Phone);
    }

    #[test]
    fn test_defaults_for_version_and_layout() {
        let schema = FormSchema::from_value(json!({"id": "f", "name": "F", "fields": []})).unwrap();
        assert_eq!(schema.version, Version::new(1, 0, 0));
        assert_eq!(schema.layout, FormLayout::Vertical);
    }

    #[test]
    fn test_definition_schema_violations() {
        let result = FormSchema::from_value(json!({
            "id": "f",
            "name": "F",
            "fields": [{ "id": "a", "type": "colour", "label": "A" }]
        }));
        match result {
            Err(FormError::InvalidDefinition(messages)) => {
                assert!(messages.iter().any(|m| m.starts_with("/fields/0/type")));
            }
            other => panic!("expected InvalidDefinition, got {:?}", other),
        }
    }

    #[test]
    fn test_self_reference_rejected() {
        let mut form = contact_form();
        form["fields"][2]["condition"]["field"] = json!("phone");
        assert!(matches!(FormSchema::from_value(form), Err(FormError::SelfReference(id)) if id == "phone"));
    }

    #[test]
    fn test_unknown_reference_rejected() {
        let mut form = contact_form();
        form["fields"][2]["condition"]["field"] = json!("hasFax");
        assert!(matches!(
            FormSchema::from_value(form),
            Err(FormError::UnknownConditionField { target, .. }) if target == "hasFax"
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let schema = FormSchema::new(
            "f",
            "F",
            vec![Field::new("a", FieldType::Text, "A"), Field::new("a", FieldType::Email, "B")],
        );
        assert!(matches!(schema.check(), Err(FormError::DuplicateField(id)) if id == "a"));
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let mut form = contact_form();
        form["fields"][0]["validation"] = json!({ "pattern": "(unclosed" });
        assert!(matches!(FormSchema::from_value(form), Err(FormError::InvalidPattern { .. })));
    }
}
