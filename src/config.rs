//! Seeding configuration.
//!
//! Lists the virtual files to write and the real folders to copy when an
//! [`Injector`](crate::inject::Injector) is created.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Errors from loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// What to put into the virtual tree up front
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InjectConfig {
    /// Directory that relative virtual paths resolve against in the host
    pub context: Option<String>,

    /// Virtual file path -> text content
    pub files: BTreeMap<String, String>,

    /// Virtual target folder -> real source folder
    pub folders: BTreeMap<String, String>,
}

impl InjectConfig {
    /// Parse a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = Self::from_json_str(&json)?;
        tracing::debug!(
            path = %path.display(),
            files = config.files.len(),
            folders = config.folders.len(),
            "Loaded inject config"
        );
        Ok(config)
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    pub fn with_folder(mut self, target: impl Into<String>, source: impl Into<String>) -> Self {
        self.folders.insert(target.into(), source.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_full_config() {
        let config = InjectConfig::from_json_str(
            r#"{
                "context": "/project",
                "files": { "src/assets/number-one.js": "module.exports = 1" },
                "folders": { "src/module/product": "/vendor/product" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.context.as_deref(), Some("/project"));
        assert_eq!(config.files["src/assets/number-one.js"], "module.exports = 1");
        assert_eq!(config.folders["src/module/product"], "/vendor/product");
    }

    #[test]
    fn test_missing_fields_default() {
        let config = InjectConfig::from_json_str("{}").unwrap();
        assert_eq!(config, InjectConfig::default());
    }

    #[test]
    fn test_parse_error() {
        let result = InjectConfig::from_json_str(r#"{ "files": [] }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inject.json");
        std::fs::write(&path, r#"{ "files": { "/a.js": "a" } }"#).unwrap();

        let config = InjectConfig::load(&path).unwrap();
        assert_eq!(config, InjectConfig::default().with_file("/a.js", "a"));

        let missing = InjectConfig::load(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
