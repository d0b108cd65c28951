//! Config file handling

use std::path::{Path, PathBuf};
use serde::Deserialize;
use crate::errors::VariabilizerError;
use crate::variabilize::VariabilizerSettings;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "APIGEE_VARIABILIZER_CONFIG_DIR";

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// `[defaults]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DefaultsSection {
    options: Vec<String>,
    start_index: Option<u32>,
}

/// On-disk layout of `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    defaults: DefaultsSection,
    variabilizer: VariabilizerSettings,
}

/// apigee-variabilizer configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub config_dir: PathBuf,
    /// Flags prepended to every invocation
    pub default_options: Vec<String>,
    /// First KVM index when `--start-index` is not given
    pub start_index: Option<u32>,
    pub variabilizer: VariabilizerSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: Self::default_config_dir(),
            default_options: Vec::new(),
            start_index: None,
            variabilizer: VariabilizerSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default config file, if present
    pub fn load() -> Result<Self, VariabilizerError> {
        let config_dir = Self::default_config_dir();
        let config_file = config_dir.join(CONFIG_FILE_NAME);

        if !config_file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&config_file)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self, VariabilizerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VariabilizerError::Config(format!("Failed to read config {}: {}", path.display(), e)))?;

        let config_dir = path.parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_config_dir);

        Self::from_toml_str(&content, config_dir)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str, config_dir: PathBuf) -> Result<Self, VariabilizerError> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| VariabilizerError::Config(format!("Invalid config TOML: {}", e)))?;

        if file.defaults.start_index == Some(0) {
            return Err(VariabilizerError::Config(
                "defaults.start_index must be at least 1".to_string()
            ));
        }

        if let Some(rule) = file.variabilizer.detection.iter().find(|r| r.keywords.is_empty()) {
            return Err(VariabilizerError::Config(format!(
                "Detection rule for '{}' has no keywords", rule.environment
            )));
        }

        Ok(Self {
            config_dir,
            default_options: file.defaults.options,
            start_index: file.defaults.start_index,
            variabilizer: file.variabilizer,
        })
    }

    /// Get the default config directory
    fn default_config_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return PathBuf::from(dir);
        }
        dirs::config_dir()
            .map(|p| p.join("apigee-variabilizer"))
            .unwrap_or_else(|| PathBuf::from(".apigee-variabilizer"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variabilize::DEFAULT_ENVIRONMENTS;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("", PathBuf::from("/tmp")).unwrap();
        assert!(config.default_options.is_empty());
        assert_eq!(config.start_index, None);
        assert_eq!(config.variabilizer, VariabilizerSettings::default());
        assert_eq!(config.variabilizer.environments, DEFAULT_ENVIRONMENTS.to_vec());
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
            [defaults]
            options = ["--format", "yaml"]
            start_index = 7

            [variabilizer]
            environments = ["dev", "test", "prod"]
            reference_scope = "private."
            variable_prefix = "target_"

            [[variabilizer.detection]]
            environment = "dev"
            keywords = ["dev", "sandbox"]

            [[variabilizer.detection]]
            environment = "prod"
            keywords = ["prod"]
        "#;
        let config = Config::from_toml_str(toml, PathBuf::from("/tmp")).unwrap();
        assert_eq!(config.default_options, vec!["--format", "yaml"]);
        assert_eq!(config.start_index, Some(7));
        assert_eq!(config.variabilizer.environments, vec!["dev", "test", "prod"]);
        assert_eq!(config.variabilizer.variable_prefix, "target_");
        assert_eq!(config.variabilizer.detection.len(), 2);
        assert_eq!(config.variabilizer.detection[1].environment, "prod");
    }

    #[test]
    fn test_partial_variabilizer_table_keeps_defaults() {
        let toml = "[variabilizer]\nvariable_prefix = \"kv\"\n";
        let config = Config::from_toml_str(toml, PathBuf::from("/tmp")).unwrap();
        assert_eq!(config.variabilizer.variable_prefix, "kv");
        assert_eq!(config.variabilizer.reference_scope, "private.");
        assert_eq!(config.variabilizer.detection.len(), 4);
    }

    #[test]
    fn test_invalid_config() {
        assert!(Config::from_toml_str("[defaults\n", PathBuf::from("/tmp")).is_err());
        assert!(Config::from_toml_str("[defaults]\nstart_index = 0\n", PathBuf::from("/tmp")).is_err());

        let empty_rule = "[[variabilizer.detection]]\nenvironment = \"dev\"\nkeywords = []\n";
        let err = Config::from_toml_str(empty_rule, PathBuf::from("/tmp")).unwrap_err();
        assert!(err.to_string().contains("no keywords"));
    }
}
