use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SalesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{file}: missing column '{column}'")]
    MissingColumn { file: PathBuf, column: String },

    #[error("{file}:{line}: invalid date '{value}'")]
    InvalidDate {
        file: PathBuf,
        line: u64,
        value: String,
    },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, SalesError>;
