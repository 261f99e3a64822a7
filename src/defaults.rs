//! Default values of a fresh form

use serde_json::Value;

use crate::field::{Field, FieldType};
use crate::validation::rules::behavior;
use crate::values::FormValues;

/// Zero value of a field type. Numbers default to `null` so an untouched
/// input is not submitted as `0`.
pub fn default_for(field_type: FieldType) -> Value {
    (behavior(field_type).default_value)()
}

/// Default value of every field, with `overrides` applied on top
pub fn generate_default_values(fields: &[Field], overrides: Option<&FormValues>) -> FormValues {
    let mut values: FormValues = fields
        .iter()
        .map(|f| (f.id.clone(), default_for(f.field_type)))
        .collect();

    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            values.insert(key.clone(), value.clone());
        }
    }

    values
}
