//! Tool configuration
//!
//! Optional TOML file (default: azconfig.toml in the working directory)
//! overriding the built-in defaults. When the file is absent the defaults
//! apply unchanged, so the tool works out of the box against the standard
//! store/vault naming scheme.

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default config file path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "azconfig.toml";

/// Tool configuration with built-in defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    /// External management tool to invoke.
    pub program: String,

    /// App Configuration resource name prefix; the full resource name is
    /// `{resource_base_name}-{env}`.
    pub resource_base_name: String,

    /// Key Vault resource holding the secrets re-attached during import.
    pub key_vault_name: String,

    /// Replacement string for secret references in exported files.
    pub secret_placeholder: String,

    /// Name of the root label that every environment inherits from.
    pub root_label: String,

    /// Scratch file used as exchange format by the appsettings operation.
    pub temp_file: String,

    /// Delay between spawning concurrent delete calls in sweep mode, in
    /// milliseconds. Rate-limits the external service.
    pub sweep_delay_ms: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            program: "az".to_string(),
            resource_base_name: "hostappconfig".to_string(),
            key_vault_name: "appconfigkv".to_string(),
            secret_placeholder: "mysecret".to_string(),
            root_label: "root".to_string(),
            temp_file: "temp.json".to_string(),
            sweep_delay_ms: 100,
        }
    }
}

impl ToolConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path, or from the default path if it exists,
    /// or fall back to the built-in defaults.
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// path is not.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Full App Configuration resource name for an environment.
    pub fn resource_name(&self, env: &str) -> String {
        format!("{}-{}", self.resource_base_name, env)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("program", &self.program),
            ("resource_base_name", &self.resource_base_name),
            ("key_vault_name", &self.key_vault_name),
            ("secret_placeholder", &self.secret_placeholder),
            ("root_label", &self.root_label),
            ("temp_file", &self.temp_file),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField(name));
            }
        }
        Ok(())
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("config field '{0}' must not be empty")]
    EmptyField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ToolConfig::default();
        assert_eq!(config.program, "az");
        assert_eq!(config.resource_name("ci"), "hostappconfig-ci");
        assert_eq!(config.root_label, "root");
        assert_eq!(config.sweep_delay_ms, 100);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "resource_base_name = \"clientconfig\"\nsweep_delay_ms = 250"
        )
        .unwrap();

        let config = ToolConfig::from_file(file.path()).unwrap();
        assert_eq!(config.resource_name("ctp"), "clientconfig-ctp");
        assert_eq!(config.sweep_delay_ms, 250);
        // Untouched fields keep their defaults
        assert_eq!(config.key_vault_name, "appconfigkv");
        assert_eq!(config.secret_placeholder, "mysecret");
    }

    #[test]
    fn test_empty_field_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "program = \"\"").unwrap();

        let err = ToolConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyField("program")));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "no_such_field = 1").unwrap();

        let result = ToolConfig::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let result = ToolConfig::load(Some(Path::new("/nonexistent/azconfig.toml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
