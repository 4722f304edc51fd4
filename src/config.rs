use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::shared::constants;

/// Which backend reads and writes image files.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum BackendPreference {
    /// Native imaging library when compiled in, protocol tool otherwise.
    #[default]
    Auto,
    Native,
    Piper,
}

impl BackendPreference {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "native" => Some(Self::Native),
            "piper" => Some(Self::Piper),
            _ => None,
        }
    }
}

/// Process-wide settings. Load once and hand to [`crate::Session::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendPreference,
    /// Program and leading arguments of the protocol tool; `read <file>` or
    /// `write <file>` is appended.
    pub tool: Vec<String>,
    /// Window viewer command; receives a protocol stream on stdin.
    pub viewer: Vec<String>,
    /// Radix announced by the built-in protocol tool.
    pub wire_radix: u32,
    pub viewer_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendPreference::Auto,
            tool: to_strings(constants::DEFAULT_TOOL),
            viewer: to_strings(constants::DEFAULT_VIEWER),
            wire_radix: constants::DEFAULT_WIRE_RADIX,
            viewer_title: constants::DEFAULT_VIEWER_TITLE.to_string(),
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// `pixgrid.json` in the working directory, then the user config dir,
    /// then defaults; `PIXGRID_BACKEND` overrides the backend choice.
    pub fn load() -> Result<Self> {
        let mut config = match Self::find_file() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        if let Ok(value) = std::env::var(constants::BACKEND_ENV_VAR) {
            config.apply_backend_override(&value)?;
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_json(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        crate::utils::logger::info(&format!("config loaded from {}", path.display()));
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(constants::MIN_RADIX..=constants::MAX_RADIX).contains(&self.wire_radix) {
            return Err(Error::Config(format!(
                "wire_radix {} is outside {}..={}",
                self.wire_radix,
                constants::MIN_RADIX,
                constants::MAX_RADIX
            )));
        }
        Ok(())
    }

    pub fn apply_backend_override(&mut self, value: &str) -> Result<()> {
        self.backend = BackendPreference::parse(value).ok_or_else(|| {
            Error::Config(format!(
                "{}={} is not one of auto, native, piper",
                constants::BACKEND_ENV_VAR,
                value
            ))
        })?;
        Ok(())
    }

    fn find_file() -> Option<PathBuf> {
        let local = PathBuf::from(constants::LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }
        let user = dirs::config_dir()?
            .join(constants::CONFIG_DIR_NAME)
            .join(constants::CONFIG_FILE_NAME);
        user.is_file().then_some(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend, BackendPreference::Auto);
        assert_eq!(config.tool, vec!["pixgrid", "piper"]);
        assert_eq!(config.viewer, vec!["pixgrid", "view"]);
        assert_eq!(config.wire_radix, 36);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = Config::from_json(r#"{ "backend": "piper", "tool": ["java", "-jar", "Piper.jar"] }"#)
            .unwrap();
        assert_eq!(config.backend, BackendPreference::Piper);
        assert_eq!(config.tool, vec!["java", "-jar", "Piper.jar"]);
        assert_eq!(config.wire_radix, 36);
    }

    #[test]
    fn test_rejects_bad_radix_and_backend() {
        assert!(matches!(
            Config::from_json(r#"{ "wire_radix": 70 }"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_json(r#"{ "backend": "opencv" }"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_backend_override() {
        let mut config = Config::default();
        config.apply_backend_override("Native").unwrap();
        assert_eq!(config.backend, BackendPreference::Native);
        assert!(config.apply_backend_override("pil").is_err());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("pixgrid_config_{}.json", std::process::id()));
        fs::write(&path, r#"{ "wire_radix": 64 }"#).unwrap();
        let config = Config::from_file(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(config.wire_radix, 64);
    }
}
