use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Conflicting settings: {0}")]
    Conflict(String),
}

/// Compiler configuration with validation.
///
/// This is the only state that outlives a compilation call.
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Suffix marking a label as optional in string label lists (`"Exposure**"`)
    #[validate(length(min = 1, message = "Optional marker cannot be empty"))]
    pub optional_marker: String,

    /// Prefix on filter-map label keys that negates all conditions of that label
    #[validate(length(min = 1, message = "NOT marker cannot be empty"))]
    pub not_marker: String,

    /// Variable bound to the neighbor inside existential sub-patterns
    #[validate(length(min = 1, message = "Neighbor variable cannot be empty"))]
    pub neighbor_variable: String,

    /// Properties of a definition label tried in order to build folded pack keys
    #[validate(length(min = 1, message = "At least one fold key property is required"))]
    pub fold_key_properties: Vec<String>,

    /// Log every compiled query and its parameters at info level
    pub verbose: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            optional_marker: "**".to_string(),
            not_marker: "!".to_string(),
            neighbor_variable: "x".to_string(),
            fold_key_properties: vec!["Term Code".to_string(), "Short Label".to_string()],
            verbose: false,
        }
    }
}

impl CompilerConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            optional_marker: env_var_or("CYPHERGEN_OPTIONAL_MARKER", defaults.optional_marker)?,
            not_marker: env_var_or("CYPHERGEN_NOT_MARKER", defaults.not_marker)?,
            neighbor_variable: env_var_or(
                "CYPHERGEN_NEIGHBOR_VARIABLE",
                defaults.neighbor_variable,
            )?,
            fold_key_properties: match env::var("CYPHERGEN_FOLD_KEYS") {
                Ok(raw) => raw
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                Err(env::VarError::NotPresent) => defaults.fold_key_properties,
                Err(e) => return Err(e.into()),
            },
            verbose: parse_env_var("CYPHERGEN_VERBOSE", "false")?,
        };

        config.check()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.check()?;
        Ok(config)
    }

    /// Field validation plus the cross-field rules the derive cannot express
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.optional_marker == self.not_marker {
            return Err(ConfigError::Conflict(format!(
                "optional marker and NOT marker are both '{}'",
                self.optional_marker
            )));
        }
        let variable_ok = self
            .neighbor_variable
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && self
                .neighbor_variable
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !variable_ok {
            return Err(ConfigError::Conflict(format!(
                "neighbor variable '{}' is not a plain identifier",
                self.neighbor_variable
            )));
        }
        Ok(())
    }
}

/// Read an environment variable, falling back to `default` when unset.
/// A set but non-unicode value is an error.
fn env_var_or(key: &str, default: String) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(value),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(e.into()),
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env_var_or(key, default.to_string())?;
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
