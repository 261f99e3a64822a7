//! Configuration for the form engine
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (forms.toml)
//! - Environment variables (FORMS__*)
//!
//! ## Example config file (forms.toml):
//! ```toml
//! [validation]
//! locale = "tr"
//! enforce_option_membership = false
//! phone_pattern = '^(\+\d{1,3}[- ]?)?\d{10}$'
//!
//! [session]
//! recompute = "full"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::validation::ValidationOptions;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormsConfig {
    /// Rule generation settings
    #[serde(default)]
    pub validation: ValidationOptions,

    /// Form session settings
    #[serde(default)]
    pub session: SessionConfig,
}

/// Session configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How the visible set is refreshed after a value change
    #[serde(default)]
    pub recompute: RecomputeStrategy,
}

/// Visible-set refresh strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecomputeStrategy {
    /// Re-evaluate every field on every change
    #[default]
    Full,
    /// Re-evaluate only fields reachable from the changed one in the
    /// dependency graph
    Incremental,
}

impl FormsConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, optionally from a specific file as well
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for location in ["forms.toml", ".forms.toml", "config/forms.toml"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "forms", "form-schemas") {
            let xdg_config = dirs.config_dir().join("forms.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // FORMS__VALIDATION__LOCALE=en
        builder = builder.add_source(
            Environment::with_prefix("FORMS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
