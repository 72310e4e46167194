use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobsDbError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing input file: {0}")]
    MissingInput(String),
}

pub type Result<T> = std::result::Result<T, JobsDbError>;
