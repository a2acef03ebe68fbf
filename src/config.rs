//! Configuration for the swipedeck shell.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings read at startup. Deck data itself is never written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Log filter used when RUST_LOG is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Column at which card text is wrapped.
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,

    /// Show the answer together with the question during a quiz.
    #[serde(default)]
    pub reveal_answers: bool,
}

fn default_log_filter() -> String {
    "warn".to_string()
}

fn default_wrap_width() -> usize {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            wrap_width: default_wrap_width(),
            reveal_answers: false,
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("swipedeck")
            .join("config.toml")
    }

    /// Load config from `path`, returning default if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;

        Ok(config)
    }

    /// Save config to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "reveal_answers = true\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.reveal_answers);
        assert_eq!(config.wrap_width, 60);
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            log_filter: "swipedeck=debug".to_string(),
            wrap_width: 40,
            reveal_answers: true,
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "wrap_width = \"wide\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
