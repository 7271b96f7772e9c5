use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Unknown source kind: {0}")]
    UnknownSourceKind(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
