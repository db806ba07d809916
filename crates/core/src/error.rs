use thiserror::Error;

use crate::payload::ActionKind;

pub type PointPulseResult<T> = Result<T, PointPulseError>;

#[derive(Error, Debug)]
pub enum PointPulseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Payload of kind {0:?} cannot be encoded")]
    Unencodable(ActionKind),

    #[error("Invalid link: {0}")]
    InvalidLink(#[from] url::ParseError),

    #[error("Invalid promotion catalog: {0}")]
    Catalog(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<config::ConfigError> for PointPulseError {
    fn from(err: config::ConfigError) -> Self {
        PointPulseError::Config(err.to_string())
    }
}
