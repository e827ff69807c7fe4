use redline_engine::EditOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_OUTPUT_SUFFIX: &str = "_redlined";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editing: EditOptions,
    pub output: OutputConfig,
}

/// Where edited documents are written when no explicit output path is given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Appended to the input file stem
    pub suffix: String,
    /// Directory for outputs instead of the input's own directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            directory: None,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the output directory
        config.output.directory = config
            .output
            .directory
            .map(|dir| Self::expand_path(&dir).unwrap_or(dir));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/redline");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Output path for `input` when the caller did not name one
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let beside_input = redline_engine::io::default_output_path(input, &self.output.suffix);
        match (&self.output.directory, beside_input.file_name()) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => beside_input,
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use redline_engine::editing::AmbiguityPolicy;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/redline/config.toml"));
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert!(config.editing.case_sensitive);
        assert!(config.editing.add_tracked_changes);
        assert!(!config.editing.add_comments);
        assert_eq!(config.editing.author_name, "Redline");
        assert_eq!(config.output.suffix, "_redlined");
    }

    #[test]
    fn test_partial_editing_section() {
        let config_content = r#"
[editing]
author_name = "Legal Review"
ambiguity_policy = "first_match"
case_sensitive = false

[output]
suffix = "-reviewed"
"#;

        let config: Config = toml::from_str(config_content).unwrap();

        assert_eq!(config.editing.author_name, "Legal Review");
        assert_eq!(config.editing.ambiguity_policy, AmbiguityPolicy::FirstMatch);
        assert!(!config.editing.case_sensitive);
        // Unset keys keep their defaults
        assert!(config.editing.add_tracked_changes);
        assert!(!config.editing.normalize_whitespace);
        assert_eq!(config.output.suffix, "-reviewed");
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[editing]\nambiguity_policy = \"sometimes\"\n").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/config.toml");
        let mut test_config = Config::default();
        test_config.editing.add_comments = true;
        test_config.editing.author_name = "Reviewer".to_string();
        test_config.output.directory = Some(PathBuf::from("/tmp/redlines"));

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_output_directory_expands_env_var() {
        unsafe {
            env::set_var("REDLINE_TEST_OUT", "/custom/out");
        }
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "[output]\ndirectory = \"$REDLINE_TEST_OUT/reviews\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(
            config.output.directory,
            Some(PathBuf::from("/custom/out/reviews"))
        );
        unsafe {
            env::remove_var("REDLINE_TEST_OUT");
        }
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path(&PathBuf::from("~/test/path")).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_output_path_for() {
        let mut config = Config::default();
        let input = Path::new("/docs/contract.md");

        assert_eq!(
            config.output_path_for(input),
            PathBuf::from("/docs/contract_redlined.md")
        );

        config.output.directory = Some(PathBuf::from("/reviews"));
        assert_eq!(
            config.output_path_for(input),
            PathBuf::from("/reviews/contract_redlined.md")
        );
    }
}
