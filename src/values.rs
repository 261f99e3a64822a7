//! Live form values and the scalar normalizations used by conditions
//! and validation.

use serde_json::{Map, Number, Value};

/// Map from field id to current value. An absent key and `null` both mean
/// "no value".
pub type FormValues = Map<String, Value>;

/// Whether a value counts as empty for required/optional checks
pub fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

/// String form used by equality-class condition operators
pub fn to_condition_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => number_to_string(n),
        Some(other) => other.to_string(),
    }
}

/// Numeric form used by ordering operators and number coercion.
///
/// Strings are trimmed before parsing; an empty string is not a number.
pub fn to_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// Convert an f64 back into a JSON number, keeping whole numbers integral
pub fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn number_to_string(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        // f64 Display prints 1.0 as "1"
        n.as_f64().map(|f| f.to_string()).unwrap_or_default()
    }
}
