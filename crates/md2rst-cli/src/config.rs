//! Configuration file support for md2rst CLI
//!
//! Loads settings from `_md2rst.toml` configuration file.

use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up next to the input
pub const CONFIG_FILE_NAME: &str = "_md2rst.toml";

/// File name the JSON schema is conventionally saved under
pub const SCHEMA_FILE_NAME: &str = "md2rst.schema.json";

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Rendering configuration
    #[serde(skip_serializing_if = "RenderConfig::is_empty")]
    pub render: RenderConfig,
    /// Output file configuration
    #[serde(skip_serializing_if = "OutputConfig::is_empty")]
    pub output: OutputConfig,
}

/// Rendering configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct RenderConfig {
    /// String used for one level of indentation (default: " ")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<String>,
}

impl RenderConfig {
    fn is_empty(&self) -> bool {
        self.indent.is_none()
    }
}

/// Output file configuration
#[derive(Debug, Default, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Extension of written files (default: "rst")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl OutputConfig {
    fn is_empty(&self) -> bool {
        self.extension.is_none()
    }
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Try to load configuration from a directory (looks for `_md2rst.toml`)
    ///
    /// Returns `Ok(None)` if the config file doesn't exist.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Generate JSON schema for the configuration
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }

    /// Generate JSON schema as a string
    pub fn json_schema_string() -> Result<String> {
        let schema = Self::json_schema();
        serde_json::to_string_pretty(&schema).context("Failed to serialize JSON schema")
    }

    /// Serialize configuration to TOML string with schema directive
    pub fn to_toml_with_schema(&self) -> Result<String> {
        let toml_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        Ok(format!("#:schema ./{}\n\n{}", SCHEMA_FILE_NAME, toml_content))
    }

    /// Create a sample configuration with the defaults spelled out
    pub fn sample() -> Self {
        Config {
            render: RenderConfig {
                indent: Some(" ".to_string()),
            },
            output: OutputConfig {
                extension: Some("rst".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.render.indent.is_none());
        assert!(config.output.extension.is_none());
    }

    #[test]
    fn test_parse_render_section() {
        let config: Config = toml::from_str(
            r#"
            [render]
            indent = "\t"
            "#,
        )
        .unwrap();

        assert_eq!(config.render.indent, Some("\t".to_string()));
        assert!(config.output.extension.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [render]
            indent = "  "

            [output]
            extension = "txt"
            "#,
        )
        .unwrap();

        assert_eq!(config.render.indent, Some("  ".to_string()));
        assert_eq!(config.output.extension, Some("txt".to_string()));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let config: Config = toml::from_str(
            r#"
            [render]
            indent = " "
            wrap = 80
            "#,
        )
        .unwrap();
        assert_eq!(config.render.indent, Some(" ".to_string()));
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[output]\nextension = \"rest\"\n",
        )
        .unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.output.extension, Some("rest".to_string()));
    }

    #[test]
    fn test_load_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[render]\nindent = 4\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_serialize_empty_config() {
        let config = Config::default();
        let toml = config.to_toml_with_schema().unwrap();
        assert!(toml.starts_with("#:schema"));
        assert!(!toml.contains("[render]"));
    }

    #[test]
    fn test_serialize_sample_config() {
        let config = Config::sample();
        let toml = config.to_toml_with_schema().unwrap();
        assert!(toml.starts_with("#:schema ./md2rst.schema.json"));
        assert!(toml.contains("[render]"));
        assert!(toml.contains("extension = \"rst\""));
    }

    #[test]
    fn test_json_schema_generation() {
        let schema = Config::json_schema_string().unwrap();
        assert!(schema.contains("\"title\""));
        assert!(schema.contains("RenderConfig"));
    }

    #[test]
    fn test_roundtrip() {
        let config = Config::sample();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.render.indent, parsed.render.indent);
        assert_eq!(config.output.extension, parsed.output.extension);
    }
}
