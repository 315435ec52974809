//! Application configuration.
//!
//! Stored as pretty-printed JSON in `config.json` inside the data directory
//! (see [`DataStorage`]). A missing file means defaults: the standard column
//! names, EST timestamps and bi-weekly billing periods.
//!
//! ```rust,no_run
//! use timebill::libs::config::Config;
//!
//! let mut config = Config::read()?;
//! config.import.timezone = "America/New_York".to_string();
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::libs::billing::PeriodLength;
use crate::libs::csv_parser::ColumnMapping;
use crate::libs::error::Error;
use crate::libs::messages::Message;
use crate::libs::zone::SourceZone;
use crate::msg_print;
use anyhow::Result;
use clap::ValueEnum;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect, Select};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_TIMEZONE: &str = "EST";

/// A section offered by the setup wizard.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

/// How CSV exports are read.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ImportConfig {
    #[serde(default)]
    pub columns: ColumnMapping,
    /// Zone label of the wall-clock timestamps in the file.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct BillingConfig {
    #[serde(default)]
    pub period: PeriodLength,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub billing: BillingConfig,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            columns: ColumnMapping::default(),
            timezone: default_timezone(),
        }
    }
}

impl ImportConfig {
    pub fn zone(&self) -> crate::libs::error::Result<SourceZone> {
        SourceZone::resolve(&self.timezone)
    }
}

impl Config {
    /// Loads the configuration, falling back to defaults when no file exists.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        Self::read_from(&config_file_path)
    }

    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        self.save_to(&config_file_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Checks that the column names are usable and the timezone resolves.
    pub fn validate(&self) -> crate::libs::error::Result<()> {
        let columns = &self.import.columns;
        let names = [&columns.start_time, &columns.end_time, &columns.comment];

        if names.iter().any(|name| name.trim().is_empty()) {
            return Err(Error::InvalidColumnMapping("column names must not be empty".to_string()));
        }
        for (i, name) in names.iter().enumerate() {
            if names[i + 1..].iter().any(|other| other.trim() == name.trim()) {
                return Err(Error::InvalidColumnMapping(format!("column '{}' is mapped twice", name)));
            }
        }

        self.import.zone()?;
        Ok(())
    }

    /// Interactive setup wizard, pre-filled with the current values.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = vec![
            ConfigModule {
                key: "import".to_string(),
                name: Message::ConfigModuleImport.to_string(),
            },
            ConfigModule {
                key: "billing".to_string(),
                name: Message::ConfigModuleBilling.to_string(),
            },
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "import" => {
                    let default = config.import.clone();
                    msg_print!(Message::ConfigModuleImport);
                    config.import = ImportConfig {
                        columns: ColumnMapping {
                            start_time: Input::with_theme(&ColorfulTheme::default())
                                .with_prompt(Message::PromptStartColumn.to_string())
                                .default(default.columns.start_time)
                                .interact_text()?,
                            end_time: Input::with_theme(&ColorfulTheme::default())
                                .with_prompt(Message::PromptEndColumn.to_string())
                                .default(default.columns.end_time)
                                .interact_text()?,
                            comment: Input::with_theme(&ColorfulTheme::default())
                                .with_prompt(Message::PromptCommentColumn.to_string())
                                .default(default.columns.comment)
                                .interact_text()?,
                        },
                        timezone: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptTimezone.to_string())
                            .default(default.timezone)
                            .validate_with(|input: &String| SourceZone::resolve(input).map(|_| ()).map_err(|e| e.to_string()))
                            .interact_text()?,
                    };
                }
                "billing" => {
                    msg_print!(Message::ConfigModuleBilling);
                    let lengths = PeriodLength::value_variants();
                    let current = lengths.iter().position(|length| *length == config.billing.period).unwrap_or(0);
                    let choice = Select::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptPeriodLength.to_string())
                        .items(&lengths.iter().map(|length| length.to_string()).collect::<Vec<_>>())
                        .default(current)
                        .interact()?;
                    config.billing.period = lengths[choice];
                }
                _ => {}
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.import.timezone, "EST");
        assert_eq!(config.import.columns.comment, "comment");
        assert_eq!(config.billing.period, PeriodLength::BiWeekly);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"billing": {"period": "weekly"}}"#).unwrap();
        assert_eq!(config.billing.period, PeriodLength::Weekly);
        assert_eq!(config.import, ImportConfig::default());
    }

    #[test]
    fn rejects_duplicate_and_empty_columns() {
        let mut config = Config::default();
        config.import.columns.comment = "time started".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidColumnMapping(_)));
        assert_eq!(err.to_string(), "invalid column mapping: column 'time started' is mapped twice");

        config.import.columns.comment = " ".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidColumnMapping(_))));
    }

    #[test]
    fn rejects_unknown_timezone() {
        let mut config = Config::default();
        config.import.timezone = "Mars/Olympus".to_string();
        assert!(matches!(config.validate(), Err(Error::UnknownTimezone(_))));
    }

    #[test]
    fn save_and_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        assert_eq!(Config::read_from(&path).unwrap(), Config::default());

        let mut config = Config::default();
        config.billing.period = PeriodLength::Monthly;
        config.import.timezone = "Europe/Berlin".to_string();
        config.save_to(&path).unwrap();

        assert_eq!(Config::read_from(&path).unwrap(), config);
    }
}
