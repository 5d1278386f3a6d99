//! CLI Configuration

use crate::output::OutputFormat;
use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use formtable_core::{DisplayOptions, ValidationMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const KEYS: [&str; 5] = ["locale", "date_format", "datetime_format", "validation_mode", "default_format"];

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: Option<String>,
    pub date_format: Option<String>,
    pub datetime_format: Option<String>,
    pub validation_mode: Option<String>,
    pub default_format: Option<String>,
}

/// Effective settings after config file and command-line flags are merged.
#[derive(Debug, Clone)]
pub struct Settings {
    pub display: DisplayOptions,
    pub mode: ValidationMode,
    pub format: OutputFormat,
}

impl Config {
    pub fn load(profile: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::config_path(profile)?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, profile: Option<&str>) -> Result<PathBuf> {
        let path = Self::config_path(profile)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing {}", path.display()))
    }

    pub fn get(&self, key: &str) -> Result<Option<&str>> {
        let value = match key {
            "locale" => &self.locale,
            "date_format" => &self.date_format,
            "datetime_format" => &self.datetime_format,
            "validation_mode" => &self.validation_mode,
            "default_format" => &self.default_format,
            _ => return Err(anyhow!("Unknown config key: {}", key)),
        };
        Ok(value.as_deref())
    }

    /// Set a key, rejecting values that would not resolve later.
    pub fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "locale" => {
                formtable_core::projection::parse_locale(&value)?;
                self.locale = Some(value);
            }
            "date_format" => self.date_format = Some(value),
            "datetime_format" => self.datetime_format = Some(value),
            "validation_mode" => {
                value.parse::<ValidationMode>()?;
                self.validation_mode = Some(value);
            }
            "default_format" => {
                OutputFormat::from_str(&value, true).map_err(|e| anyhow!(e))?;
                self.default_format = Some(value);
            }
            _ => return Err(anyhow!("Unknown config key: {}", key)),
        }
        Ok(())
    }

    /// Merge with flag overrides; flags win over the file.
    pub fn resolve(
        &self,
        locale: Option<&str>,
        mode: Option<&str>,
        format: Option<OutputFormat>,
    ) -> Result<Settings> {
        let mut display = match locale.or(self.locale.as_deref()) {
            Some(name) => DisplayOptions::for_locale(name)?,
            None => DisplayOptions::default(),
        };
        if let Some(fmt) = &self.date_format {
            display.date_format = fmt.clone();
        }
        if let Some(fmt) = &self.datetime_format {
            display.datetime_format = fmt.clone();
        }

        let mode = match mode.or(self.validation_mode.as_deref()) {
            Some(m) => m.parse::<ValidationMode>()?,
            None => ValidationMode::default(),
        };

        let format = match (format, self.default_format.as_deref()) {
            (Some(f), _) => f,
            (None, Some(f)) => OutputFormat::from_str(f, true).map_err(|e| anyhow!(e))?,
            (None, None) => OutputFormat::Table,
        };

        Ok(Settings { display, mode, format })
    }

    fn config_path(profile: Option<&str>) -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot find home directory"))?;
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(home.join(".formtable").join(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.set("locale", "de_DE".into()).unwrap();
        config.set("validation_mode", "on_blur".into()).unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.get("locale").unwrap(), Some("de_DE"));
        assert_eq!(loaded.get("validation_mode").unwrap(), Some("on_blur"));
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("locale", "xx_YY".into()).is_err());
        assert!(config.set("validation_mode", "sometimes".into()).is_err());
        assert!(config.set("default_format", "csv".into()).is_err());
        assert!(config.set("colour", "red".into()).is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_locale_picks_medium_patterns() {
        let settings = Config::default().resolve(Some("de_DE"), None, None).unwrap();
        assert_eq!(settings.display.date_format, "%d.%m.%Y");

        let config = Config { date_format: Some("%Y-%m-%d".into()), ..Config::default() };
        let settings = config.resolve(Some("de_DE"), None, None).unwrap();
        assert_eq!(settings.display.date_format, "%Y-%m-%d");
    }

    #[test]
    fn test_flags_override_file() {
        let config = Config {
            validation_mode: Some("on_change".into()),
            default_format: Some("json".into()),
            ..Config::default()
        };
        let settings = config.resolve(None, Some("all"), None).unwrap();
        assert_eq!(settings.mode, ValidationMode::All);
        assert_eq!(settings.format, OutputFormat::Json);

        let settings = config.resolve(None, None, Some(OutputFormat::Yaml)).unwrap();
        assert_eq!(settings.mode, ValidationMode::OnChange);
        assert_eq!(settings.format, OutputFormat::Yaml);
    }
}
