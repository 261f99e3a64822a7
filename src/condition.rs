//! Condition evaluation
//!
//! Decides which fields are visible for a given set of values. Evaluation is
//! pure and never fails: a malformed GT/LT operand hides the field, while an
//! unknown operator leaves it visible.

use std::collections::BTreeSet;

use crate::field::{Condition, ConditionOperator, Field};
use crate::values::{to_condition_string, to_number, FormValues};

/// Set of currently visible field ids
pub type VisibleFields = BTreeSet<String>;

/// Whether `field` should be shown for the given values
pub fn is_visible(field: &Field, values: &FormValues) -> bool {
    match &field.condition {
        None => true,
        Some(condition) => evaluate(condition, values),
    }
}

/// Evaluate a single condition against the current values
pub fn evaluate(condition: &Condition, values: &FormValues) -> bool {
    let current = values.get(&condition.field);
    let expected = Some(&condition.value);

    match condition.operator {
        ConditionOperator::Equals => to_condition_string(current) == to_condition_string(expected),
        ConditionOperator::NotEquals => to_condition_string(current) != to_condition_string(expected),
        ConditionOperator::Gt => match (to_number(current), to_number(expected)) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        },
        ConditionOperator::Lt => match (to_number(current), to_number(expected)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
        ConditionOperator::Unknown => true,
    }
}

/// Ids of every field visible for the given values
pub fn visible_field_ids(fields: &[Field], values: &FormValues) -> VisibleFields {
    fields
        .iter()
        .filter(|f| is_visible(f, values))
        .map(|f| f.id.clone())
        .collect()
}

/// Fields whose condition reads `field_id`
pub fn dependent_fields<'a>(fields: &'a [Field], field_id: &str) -> Vec<&'a Field> {
    fields
        .iter()
        .filter(|f| f.depends_on() == Some(field_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;
    use serde_json::{json, Value};

    fn values(v: Value) -> FormValues {
        v.as_object().cloned().unwrap_or_default()
    }

    fn conditional(operator: ConditionOperator, value: Value) -> Field {
        Field::new("b", FieldType::Text, "B").with_condition(Condition::new("a", operator, value))
    }

    #[test]
    fn test_unconditional_field_always_visible() {
        let field = Field::new("a", FieldType::Text, "A");
        assert!(is_visible(&field, &FormValues::new()));
        assert!(is_visible(&field, &values(json!({"x": 1, "a": "whatever"}))));
    }

    #[test]
    fn test_equals() {
        let field = conditional(ConditionOperator::Equals, json!("x"));
        assert!(is_visible(&field, &values(json!({"a": "x"}))));
        assert!(!is_visible(&field, &values(json!({"a": "y"}))));
        assert!(!is_visible(&field, &FormValues::new()));
    }

    #[test]
    fn test_equals_normalizes_booleans_and_numbers() {
        let field = conditional(ConditionOperator::Equals, json!(true));
        assert!(is_visible(&field, &values(json!({"a": true}))));
        assert!(is_visible(&field, &values(json!({"a": "true"}))));
        assert!(!is_visible(&field, &values(json!({"a": false}))));

        let field = conditional(ConditionOperator::Equals, json!("3"));
        assert!(is_visible(&field, &values(json!({"a": 3}))));
    }

    #[test]
    fn test_not_equals() {
        let field = conditional(ConditionOperator::NotEquals, json!("x"));
        assert!(!is_visible(&field, &values(json!({"a": "x"}))));
        assert!(is_visible(&field, &values(json!({"a": "y"}))));
        assert!(is_visible(&field, &FormValues::new()));
    }

    #[test]
    fn test_ordering_operators() {
        let gt = conditional(ConditionOperator::Gt, json!(5));
        assert!(is_visible(&gt, &values(json!({"a": 6}))));
        assert!(is_visible(&gt, &values(json!({"a": "10"}))));
        assert!(!is_visible(&gt, &values(json!({"a": 5}))));

        let lt = conditional(ConditionOperator::Lt, json!("5"));
        assert!(is_visible(&lt, &values(json!({"a": 4.5}))));
        assert!(!is_visible(&lt, &values(json!({"a": 9}))));
    }

    #[test]
    fn test_ordering_with_non_numeric_operand_hides() {
        let gt = conditional(ConditionOperator::Gt, json!(5));
        assert!(!is_visible(&gt, &values(json!({"a": "abc"}))));
        assert!(!is_visible(&gt, &FormValues::new()));

        let lt = conditional(ConditionOperator::Lt, json!("many"));
        assert!(!is_visible(&lt, &values(json!({"a": 1}))));
    }

    #[test]
    fn test_unknown_operator_shows() {
        let field = conditional(ConditionOperator::Unknown, json!("x"));
        assert!(is_visible(&field, &FormValues::new()));
    }

    #[test]
    fn test_visible_field_ids_is_stable() {
        let fields = vec![
            Field::new("a", FieldType::Text, "A"),
            conditional(ConditionOperator::Equals, json!("x")),
        ];
        let current = values(json!({"a": "y"}));

        let first = visible_field_ids(&fields, &current);
        let second = visible_field_ids(&fields, &current);
        assert_eq!(first, second);
        assert_eq!(first.into_iter().collect::<Vec<_>>(), vec!["a".to_string()]);
    }

    #[test]
    fn test_dependent_fields() {
        let fields = vec![
            Field::new("a", FieldType::Checkbox, "A"),
            conditional(ConditionOperator::Equals, json!(true)),
            Field::new("c", FieldType::Text, "C")
                .with_condition(Condition::new("b", ConditionOperator::Equals, "x")),
        ];
        let deps: Vec<_> = dependent_fields(&fields, "a").iter().map(|f| f.id.as_str()).collect();
        assert_eq!(deps, vec!["b"]);
        assert!(dependent_fields(&fields, "c").is_empty());
    }
}
