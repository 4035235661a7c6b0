//! Resolver configuration.
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! [resolver]
//! restricted = false   # policy-only editors
//! page_size = 100      # catalog page size for candidate enumeration
//!
//! [defaults]
//! timeout_seconds = 30
//! enabled = true
//! negate = false
//! ```

use std::path::{Path, PathBuf};

use binding_model::DEFAULT_TIMEOUT_SECONDS;
use binding_store::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};

use crate::resolver::ResolverMode;

/// Top-level resolver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub resolver: ResolverSettings,
    pub defaults: BindingDefaults,
}

/// `[resolver]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Force the policy target and disable switching.
    pub restricted: bool,
    pub page_size: u32,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            restricted: false,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// `[defaults]` section: values applied to freshly created bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingDefaults {
    pub timeout_seconds: u32,
    pub enabled: bool,
    pub negate: bool,
}

impl Default for BindingDefaults {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            enabled: true,
            negate: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse resolver config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid resolver config: {0}")]
    Invalid(String),
}

impl ResolverConfig {
    /// Default configuration in policy-only mode.
    pub fn restricted() -> Self {
        let mut config = Self::default();
        config.resolver.restricted = true;
        config
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn mode(&self) -> ResolverMode {
        if self.resolver.restricted {
            ResolverMode::PolicyOnly
        } else {
            ResolverMode::Unrestricted
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.resolver.page_size == 0 {
            return Err(ConfigError::Invalid(
                "resolver.page_size must be at least 1".to_string(),
            ));
        }
        if self.defaults.timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "defaults.timeout_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = ResolverConfig::from_toml_str("").unwrap();
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.resolver.page_size, 100);
        assert_eq!(config.defaults.timeout_seconds, 30);
        assert!(config.defaults.enabled);
        assert!(!config.defaults.negate);
        assert_eq!(config.mode(), ResolverMode::Unrestricted);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = ResolverConfig::from_toml_str(
            r#"
            [resolver]
            restricted = true

            [defaults]
            timeout_seconds = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.mode(), ResolverMode::PolicyOnly);
        assert_eq!(config.resolver.page_size, 100);
        assert_eq!(config.defaults.timeout_seconds, 10);
        assert!(config.defaults.enabled);
    }

    #[test]
    fn zero_page_size_is_invalid() {
        let err = ResolverConfig::from_toml_str("[resolver]\npage_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let err = ResolverConfig::from_toml_str("[defaults]\ntimeout_seconds = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = ResolverConfig::from_toml_str("[resolver\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[resolver]\npage_size = 25").unwrap();

        let config = ResolverConfig::load(file.path()).unwrap();
        assert_eq!(config.resolver.page_size, 25);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = ResolverConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }
}
