//! YAML configuration for the topicdiff pipeline.
//!
//! One file carries the settings of every stage. Every section is optional
//! and falls back to the library defaults.
//!
//! ```yaml
//! version: "1.0"
//! name: "cluster 5 review"
//!
//! normalize:
//!   preserve_newlines: false
//!   fold_ligatures: true
//!
//! align:
//!   match_threshold: 0.78
//!   notable_similarity: 0.9
//!   max_notable: 5
//!   snippet_chars: 160
//!   label_penalty: 4.0
//!   unmatched_penalty: 1.5
//!
//! portal:
//!   timeout_secs: 20
//!   allowed_host: "ec.europa.eu"
//! ```

use std::fs;
use std::path::Path;

use align::AlignConfig;
use normalize::PdfNormalizeConfig;
use portal::PortalConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading a YAML configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TopicDiffConfig {
    /// Configuration format version.
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    /// PDF normalizer settings.
    #[serde(default)]
    pub normalize: PdfNormalizeConfig,

    #[serde(default)]
    pub align: AlignConfig,

    #[serde(default)]
    pub portal: PortalConfig,
}

impl TopicDiffConfig {
    /// Load a YAML configuration file from the given path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: TopicDiffConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => {}
            v => return Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }

        self.align
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("align: {err}")))?;
        self.portal
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("portal: {err}")))?;
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl Default for TopicDiffConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            normalize: PdfNormalizeConfig::default(),
            align: AlignConfig::default(),
            portal: PortalConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "cluster review"
normalize:
  preserve_newlines: true
align:
  match_threshold: 0.8
"#;

        let config = TopicDiffConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name.as_deref(), Some("cluster review"));
        assert!(config.normalize.preserve_newlines);
        assert!(config.normalize.fold_ligatures);
        assert_eq!(config.align.match_threshold, 0.8);
        assert_eq!(config.align.max_notable, 5);
        assert_eq!(config.portal, PortalConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"version: \"1\"\nportal:\n  timeout_secs: 5\n")
            .unwrap();

        let config = TopicDiffConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.portal.timeout_secs, 5);
    }

    #[test]
    fn test_missing_file() {
        let err = TopicDiffConfig::from_file("/nonexistent/topicdiff.yaml").unwrap_err();
        assert!(matches!(err, ConfigLoadError::FileRead(_)));
    }

    #[test]
    fn test_unsupported_version() {
        let err = TopicDiffConfig::from_yaml("version: \"2.0\"\n").unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnsupportedVersion(v) if v == "2.0"));
    }

    #[test]
    fn test_invalid_stage_config() {
        let err = TopicDiffConfig::from_yaml("version: \"1.0\"\nalign:\n  match_threshold: 1.5\n")
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::Validation(msg) if msg.starts_with("align:")));

        let err = TopicDiffConfig::from_yaml("version: \"1.0\"\nportal:\n  timeout_secs: 0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigLoadError::Validation(msg) if msg.starts_with("portal:")));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = TopicDiffConfig::from_yaml("version: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigLoadError::YamlParse(_)));
    }

    #[test]
    fn test_default_round_trips() {
        let config = TopicDiffConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(TopicDiffConfig::from_yaml(&yaml).unwrap(), config);
    }
}
