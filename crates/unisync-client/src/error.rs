use thiserror::Error;

use unisync_store::StoreError;

/// Everything that can go wrong on the client side of UniSync.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No response was received (DNS, connection refused, TLS...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-2xx status. `message` is the server's
    /// `detail` when it sent one, `"Request failed: <status>"` otherwise.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Message is empty")]
    EmptyMessage,

    /// Terminal input that is not a known command or misses its argument.
    #[error("{0}")]
    Command(String),
}

impl ClientError {
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
