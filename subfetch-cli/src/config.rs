use std::path::{Path, PathBuf};

use serde::Deserialize;
use subtitle_platforms::SubtitleFormat;
use subtitle_platforms::viki::VikiConfig;
use tracing::debug;

use crate::error::{CliError, Result};

const APP_DIR: &str = "subfetch";

/// Settings read from `config.toml`. Command line flags take precedence.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub download_path: PathBuf,
    pub cookies_path: PathBuf,
    /// Comma separated language codes, or `all`.
    pub languages: String,
    pub format: SubtitleFormat,
    pub viki: VikiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            download_path: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            cookies_path: app_dir()
                .map(|dir| dir.join("cookies.txt"))
                .unwrap_or_else(|| PathBuf::from("cookies.txt")),
            languages: "en".to_string(),
            format: SubtitleFormat::default(),
            viki: VikiConfig::default(),
        }
    }
}

fn app_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

pub fn default_config_path() -> Option<PathBuf> {
    app_dir().map(|dir| dir.join("config.toml"))
}

impl AppConfig {
    /// An explicit path must exist. The default location falls back to
    /// built-in settings when no file is there.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
download_path = "/data/subs"
languages = "en,zt"
format = "vtt"

[viki]
request_timeout_secs = 10
"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.download_path, PathBuf::from("/data/subs"));
        assert_eq!(config.languages, "en,zt");
        assert_eq!(config.format, SubtitleFormat::Vtt);
        assert_eq!(config.viki.request_timeout_secs, 10);
        assert_eq!(config.viki.platform, "Viki");
        assert_eq!(config.cookies_path, AppConfig::default().cookies_path);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = AppConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(CliError::ConfigRead { .. })));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "format = \"ass\"").unwrap();
        assert!(matches!(
            AppConfig::load(Some(&path)),
            Err(CliError::ConfigParse { .. })
        ));
    }
}
