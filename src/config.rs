//! Renderer configuration, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Figure width in percent when a figure has no `width` argument
    pub figure_width: u32,
    /// Prepended to every CSS class the HTML renderer emits
    pub class_prefix: String,
    /// Show equation numbers next to numbered equations
    pub equation_numbers: bool,
    /// LaTeX environment wrapping code blocks
    pub latex_code_env: String,
    /// Base path for `[[article]]` internal links
    pub internal_link_base: String,
    /// Base path for `#tag` links
    pub hash_link_base: String,
    /// Base path for images referenced by upload key
    pub image_base: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            figure_width: 50,
            class_prefix: String::new(),
            equation_numbers: true,
            latex_code_env: "blockcode".to_string(),
            internal_link_base: "/r/".to_string(),
            hash_link_base: "/t/".to_string(),
            image_base: "/img/".to_string(),
        }
    }
}

impl RenderConfig {
    /// Parse a configuration from TOML text; missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigParseError`] for malformed TOML.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigReadError`] if the file cannot be read
    /// and [`ConfigError::ConfigParseError`] if it is not valid TOML.
    pub fn load<P: AsRef<Path>>(config_path: P) -> ConfigResult<Self> {
        let config_path = config_path.as_ref();
        let content =
            std::fs::read_to_string(config_path).map_err(|source| ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        Self::from_toml_str(&content)
    }

    /// `class` with the configured prefix applied.
    #[must_use]
    pub fn class(&self, class: &str) -> String {
        format!("{}{class}", self.class_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_for_missing_keys() {
        let config = RenderConfig::from_toml_str("figure_width = 80").unwrap();
        assert_eq!(config.figure_width, 80);
        assert_eq!(config.latex_code_env, "blockcode");
        assert!(config.equation_numbers);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(RenderConfig::from_toml_str("").unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = RenderConfig::from_toml_str("figure_width = \"wide\"").unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "class_prefix = \"l2-\"\nequation_numbers = false").unwrap();
        let config = RenderConfig::load(file.path()).unwrap();
        assert_eq!(config.class("bold-inline"), "l2-bold-inline");
        assert!(!config.equation_numbers);
    }

    #[test]
    fn test_load_missing_file() {
        let err = RenderConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ConfigReadError { .. }));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = RenderConfig {
            figure_width: 30,
            ..RenderConfig::default()
        };
        let toml_str = toml::to_string(&original).unwrap();
        let deserialized = RenderConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(original, deserialized);
    }
}
