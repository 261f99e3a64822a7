//! Error types for the form engine

use thiserror::Error;

/// Result type for form operations
pub type Result<T> = std::result::Result<T, FormError>;

/// Form engine errors
///
/// Per-field validation failures are not errors; they are reported through
/// [`crate::validation::ValidationErrors`].
#[derive(Error, Debug)]
pub enum FormError {
    #[error("Duplicate field id: {0}")]
    DuplicateField(String),

    #[error("Field {0} has a condition that references itself")]
    SelfReference(String),

    #[error("Field {field} has a condition on unknown field {target}")]
    UnknownConditionField { field: String, target: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid pattern for field {field}: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid form definition: {}", .0.join("; "))]
    InvalidDefinition(Vec<String>),

    #[error("A submission is already in progress")]
    SubmitInProgress,

    #[error("Form submission failed: {0}")]
    Submit(#[source] anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}
