use thiserror::Error;

use crate::core::types::Position;

#[derive(Error, Debug)]
pub enum ClassroomError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot place {what} at {position}: {reason}")]
    InvalidPlacement {
        what: &'static str,
        position: Position,
        reason: &'static str,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClassroomError>;
