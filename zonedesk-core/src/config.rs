//! Configuration file model and loader.
//!
//! ```toml
//! [internal]
//! debug = false
//!
//! [authentication]
//! module = "static"
//! [authentication.users]
//! admin = "<sha256 hex of password>"
//!
//! [autologin]
//! module = "session"
//!
//! [zone.main]
//! module = "json"
//! api_base = "http://127.0.0.1:8080/api"
//! server_sysname = "ns1"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use zonedesk_backend::BackendSpec;

use crate::error::CoreError;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
}

impl From<ConfigError> for CoreError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InternalConfig {
    pub debug: bool,
}

/// `[authentication]`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "module", rename_all = "lowercase")]
pub enum AuthenticationConfig {
    /// Users and hex SHA-256 password hashes listed inline.
    Static {
        #[serde(default)]
        users: BTreeMap<String, String>,
    },
}

impl Default for AuthenticationConfig {
    fn default() -> Self {
        Self::Static {
            users: BTreeMap::new(),
        }
    }
}

/// `[authorization]`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(tag = "module", rename_all = "lowercase")]
pub enum AuthorizationConfig {
    /// Every logged-in user may do everything.
    #[default]
    All,
}

/// `[autologin]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "module", rename_all = "lowercase")]
pub enum AutologinConfig {
    /// Whoever logged in last through `status`.
    #[default]
    Session,
    /// A fixed user, no login needed.
    Static { username: String },
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub internal: InternalConfig,
    pub authentication: AuthenticationConfig,
    pub authorization: AuthorizationConfig,
    pub autologin: AutologinConfig,
    /// Backends keyed by sysname.
    pub zone: BTreeMap<String, BackendSpec>,
}

impl Configuration {
    /// Parse and validate configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::debug!(
            "Loaded configuration from {} ({} backends)",
            path.display(),
            config.zone.len()
        );
        Ok(config)
    }

    /// Structural checks only; backend options are checked when the
    /// backend is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let AuthenticationConfig::Static { users } = &self.authentication;
        for (name, hash) in users {
            if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                errors.push(format!(
                    "authentication.users.{name}: expected a hex SHA-256 hash"
                ));
            }
        }

        if let AutologinConfig::Static { username } = &self.autologin {
            if username.trim().is_empty() {
                errors.push("autologin.username: must not be empty".to_string());
            }
        }

        for sysname in self.zone.keys() {
            if sysname.trim().is_empty() || sysname.contains('/') {
                errors.push(format!("zone.{sysname}: invalid sysname"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[internal]
debug = true

[authentication]
module = "static"
[authentication.users]
admin = "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"

[authorization]
module = "all"

[autologin]
module = "static"
username = "admin"

[zone.main]
module = "json"
api_base = "http://127.0.0.1:8080/api"
server_sysname = "ns1"
timeout_secs = 30

[zone.scratch]
module = "memory"
views = ["internal", "external"]
"#;

    #[test]
    fn parses_full_file() {
        let config = Configuration::from_toml_str(FULL).unwrap();
        assert!(config.internal.debug);
        let AuthenticationConfig::Static { users } = &config.authentication;
        assert!(users.contains_key("admin"));
        assert!(matches!(
            &config.autologin,
            AutologinConfig::Static { username } if username == "admin"
        ));

        let main = &config.zone["main"];
        assert_eq!(main.module, "json");
        assert_eq!(main.options["server_sysname"], "ns1");
        assert_eq!(main.options["timeout_secs"], 30);
        assert_eq!(config.zone["scratch"].options["views"][1], "external");
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Configuration::from_toml_str("").unwrap();
        assert!(!config.internal.debug);
        assert!(matches!(config.autologin, AutologinConfig::Session));
        assert!(config.zone.is_empty());
    }

    #[test]
    fn rejects_unknown_autologin_module() {
        let res = Configuration::from_toml_str("[autologin]\nmodule = \"ldap\"\n");
        assert!(matches!(res, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn collects_validation_errors() {
        let text = r#"
[authentication]
module = "static"
[authentication.users]
admin = "plaintext"

[autologin]
module = "static"
username = " "
"#;
        let Err(ConfigError::Validation(errors)) = Configuration::from_toml_str(text) else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let res = Configuration::load(Path::new("/nonexistent/zonedesk.toml"));
        let err = res.unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(CoreError::from(err).to_string().starts_with("Configuration error: IO error"));
    }
}
