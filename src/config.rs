use crate::constants::DEFAULT_BATCH_SIZE;
use crate::error::{JobsDbError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub import: ImportConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Raw scraped postings, a JSON array of objects.
    pub raw_file: PathBuf,
    /// Intermediate file holding the normalized sequence.
    pub cleaned_file: PathBuf,
    /// SQLite database file.
    pub database_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_file: PathBuf::from("data.json"),
            cleaned_file: PathBuf::from("data_cleaned.json"),
            database_file: PathBuf::from("jobs_database.db"),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 5000 }
    }
}

impl Config {
    /// Load `config.toml` from the working directory. A missing file means
    /// the defaults above; a file that fails to parse is an error.
    pub fn load() -> Result<Self> {
        if !Path::new(CONFIG_PATH).exists() {
            return Ok(Config::default());
        }
        let config_content = fs::read_to_string(CONFIG_PATH).map_err(|e| {
            JobsDbError::Config(format!("Failed to read config file '{CONFIG_PATH}': {e}"))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_section() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.data.raw_file, PathBuf::from("data.json"));
        assert_eq!(config.import.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8080
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.data.cleaned_file, PathBuf::from("data_cleaned.json"));
    }
}
