//! Error type shared by the connector and the examples.
//!
//! Every lower-layer failure converts into [`ExampleError`] with its message
//! and cause preserved, so examples propagate with `?`.

use thiserror::Error;

use crate::config::ConfigError;
use crate::sdk::{AccessError, CadenceError, CryptoError, FlowAddress, FlowId, ModelError, TransactionError};

#[derive(Debug, Error)]
pub enum ExampleError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Cadence(#[from] CadenceError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("script '{0}' not found")]
    ScriptNotFound(String),

    #[error("failed to read script '{name}': {source}")]
    ScriptIo {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("account {address} has no key at index {index}")]
    KeyIndexOutOfRange { address: FlowAddress, index: u32 },

    /// The sealed result carried an execution error.
    #[error("transaction {id} failed: {message}")]
    TransactionFailed { id: FlowId, message: String },

    #[error("transaction {id} expired before it was sealed")]
    Expired { id: FlowId },

    #[error("transaction {id} was not sealed within {seconds} seconds")]
    SealTimeout { id: FlowId, seconds: u64 },

    #[error("amount {0} must have exactly 8 decimal places")]
    InvalidAmountScale(String),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Result type for the examples.
pub type ExampleResult<T> = Result<T, ExampleError>;

impl ExampleError {
    /// Execution error code carried by an access or transaction failure.
    pub fn error_code(&self) -> Option<u32> {
        match self {
            Self::Access(e) => e.error_code().map(|c| c.code()),
            Self::TransactionFailed { message, .. } => crate::sdk::error::parse_error_code(message),
            Self::Model(ModelError::TransactionFailed { error_code, .. }) => *error_code,
            _ => None,
        }
    }
}
