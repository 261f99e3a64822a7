//! Form Definition Linting
//!
//! Reports problems in a form definition before it reaches a session.
//! Errors are definitions a session would refuse or that cannot work;
//! warnings are legal but suspicious.
//!
//! ## Lints
//! 1. **References**: duplicate ids, self references, unknown condition targets
//! 2. **Bounds**: uncompilable patterns, `min > max`
//! 3. **Choices**: missing, ignored or duplicated options
//! 4. **Conditions**: unknown operators (always visible), ordering against
//!    non-numeric values (never visible), dependency cycles

use std::collections::HashSet;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use regex::Regex;

use crate::dependency::DependencyGraph;
use crate::field::{ConditionOperator, Field};
use crate::form::FormSchema;
use crate::values::to_number;

/// Result of linting a form
#[derive(Debug, Default)]
pub struct LintResult {
    pub form_id: String,
    pub errors: Vec<LintError>,
    pub warnings: Vec<LintWarning>,
}

impl LintResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    fn error(&mut self, code: &'static str, path: String, message: String) {
        self.errors.push(LintError { code, message, path });
    }

    fn warning(&mut self, code: &'static str, path: String, message: String) {
        self.warnings.push(LintWarning { code, message, path });
    }
}

#[derive(Debug)]
pub struct LintError {
    pub code: &'static str,
    pub message: String,
    pub path: String,
}

#[derive(Debug)]
pub struct LintWarning {
    pub code: &'static str,
    pub message: String,
    pub path: String,
}

/// The form definition linter
pub struct FormLinter {
    matcher: SkimMatcherV2,
}

impl Default for FormLinter {
    fn default() -> Self {
        Self::new()
    }
}

impl FormLinter {
    pub fn new() -> Self {
        Self {
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Lint a form definition
    pub fn lint(&self, schema: &FormSchema) -> LintResult {
        let mut result = LintResult {
            form_id: schema.id.clone(),
            ..Default::default()
        };

        let mut seen = HashSet::new();
        for field in &schema.fields {
            if !seen.insert(field.id.as_str()) {
                result.error("E001", path(field, "id"), format!("duplicate field id '{}'", field.id));
            }
        }

        for field in &schema.fields {
            self.lint_condition(field, &seen, &mut result);
            lint_bounds(field, &mut result);
            lint_options(field, &mut result);
        }

        for cycle in DependencyGraph::build(&schema.fields).cycles() {
            // self references are already reported as E002
            if cycle.len() > 1 {
                result.warning(
                    "W006",
                    format!("fields/{}/condition", cycle[0]),
                    format!("conditions form a cycle: {}", cycle.join(" -> ")),
                );
            }
        }

        result
    }

    fn lint_condition(&self, field: &Field, ids: &HashSet<&str>, result: &mut LintResult) {
        let Some(condition) = &field.condition else {
            return;
        };
        let at = path(field, "condition");

        if condition.field == field.id {
            result.error("E002", at.clone(), format!("field '{}' depends on itself", field.id));
        } else if !ids.contains(condition.field.as_str()) {
            let message = match self.suggest(&condition.field, ids) {
                Some(best) => format!("unknown field '{}' (did you mean '{}'?)", condition.field, best),
                None => format!("unknown field '{}'", condition.field),
            };
            result.error("E003", at.clone(), message);
        }

        match condition.operator {
            ConditionOperator::Unknown => result.warning(
                "W004",
                at,
                "unknown operator; the field will always be visible".to_string(),
            ),
            op if op.is_ordering() && to_number(Some(&condition.value)).is_none() => result.warning(
                "W005",
                at,
                format!("{:?} against non-numeric value {}; the field will never be visible", op, condition.value),
            ),
            _ => {}
        }
    }

    fn suggest<'a>(&self, target: &str, ids: &HashSet<&'a str>) -> Option<&'a str> {
        ids.iter()
            .filter_map(|id| self.matcher.fuzzy_match(id, target).map(|score| (score, *id)))
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(a.1)))
            .map(|(_, id)| id)
    }
}

fn path(field: &Field, part: &str) -> String {
    format!("fields/{}/{}", field.id, part)
}

fn lint_bounds(field: &Field, result: &mut LintResult) {
    if let Some(pattern) = field.pattern() {
        if !field.field_type.supports_pattern() {
            result.warning(
                "W007",
                path(field, "validation/pattern"),
                format!("pattern is ignored for {} fields", field.field_type),
            );
        } else if let Err(e) = Regex::new(pattern) {
            result.error("E004", path(field, "validation/pattern"), format!("invalid pattern: {}", e));
        }
    }

    if let (Some(min), Some(max)) = (field.min(), field.max()) {
        if min > max {
            result.error(
                "E005",
                path(field, "validation"),
                format!("min {} is greater than max {}; no value can pass", min, max),
            );
        }
    }
}

fn lint_options(field: &Field, result: &mut LintResult) {
    if field.field_type.is_choice() {
        if field.options.is_empty() {
            result.warning(
                "W001",
                path(field, "options"),
                format!("{} field has no options", field.field_type),
            );
        }
        let mut values = HashSet::new();
        for option in &field.options {
            if !values.insert(option.value.as_str()) {
                result.warning(
                    "W003",
                    path(field, "options"),
                    format!("duplicate option value '{}'", option.value),
                );
            }
        }
    } else if !field.options.is_empty() {
        result.warning(
            "W002",
            path(field, "options"),
            format!("options are ignored for {} fields", field.field_type),
        );
    }
}
