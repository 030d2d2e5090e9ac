use novoscore::NovoScoreError;
use novoscore::errors::{
    ConfigError,
    TableReadingError,
    TableWritingError,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Error interpreting the config: {0}")]
    Config(String),

    #[error("Invalid progress bar template: {0}")]
    ProgressTemplate(#[from] indicatif::style::TemplateError),

    #[error(transparent)]
    NovoScore(#[from] NovoScoreError),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::NovoScore(e.into())
    }
}

impl From<TableReadingError> for CliError {
    fn from(e: TableReadingError) -> Self {
        CliError::NovoScore(e.into())
    }
}

impl From<TableWritingError> for CliError {
    fn from(e: TableWritingError) -> Self {
        CliError::NovoScore(e.into())
    }
}
