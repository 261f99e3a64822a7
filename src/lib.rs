//! Dynamic Form Schema Engine
//!
//! Turns a declarative form definition into a live, validated form session
//! for the public site and the admin panel.
//!
//! ## Features
//!
//! - **Conditional Visibility**: fields show or hide based on other fields' values
//! - **Default Values**: every field type has a well-defined zero value
//! - **Generated Validation**: per-type rules with label-interpolated messages
//! - **Submission Filtering**: only visible fields are ever submitted
//! - **Linting & Export**: definition diagnostics and JSON Schema export
//!
//! ## Data Flow
//!
//! ```text
//! FormSchema (JSON)
//!   ├── generate_default_values ──► initial FormValues
//!   ├── FormValidator::build ─────► composite validator
//!   └── DependencyGraph ──────────► condition dependencies
//!
//! FormSession
//!   set_value ──► visible_field_ids ──► visible set
//!   submit ─────► validate (visible only) ──► filtered payload ──► callback
//! ```

pub mod condition;
pub mod config;
pub mod defaults;
pub mod dependency;
pub mod error;
pub mod field;
pub mod form;
pub mod json_schema;
pub mod lint;
pub mod session;
pub mod validation;
pub mod values;

pub use condition::{dependent_fields, is_visible, visible_field_ids, VisibleFields};
pub use config::{FormsConfig, RecomputeStrategy};
pub use defaults::{default_for, generate_default_values};
pub use dependency::DependencyGraph;
pub use error::{FormError, Result};
pub use field::{Condition, ConditionOperator, Field, FieldOption, FieldType, FieldValidation};
pub use form::{FormLayout, FormSchema};
pub use lint::{FormLinter, LintResult};
pub use session::{FormSession, SessionState, SubmitOutcome};
pub use validation::{FieldError, FormValidator, Locale, ValidationErrors, ValidationOptions};
pub use values::FormValues;
