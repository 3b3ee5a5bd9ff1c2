//! Error types for ledger helpers
//!
//! Block and transaction rejection is never an error: it is reported through
//! [`ValidationResult`](crate::types::ValidationResult) or a plain `bool`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("Input index {index} out of range for transaction with {inputs} inputs")]
    InputIndexOutOfRange { index: usize, inputs: usize },

    #[error("Unknown block: {0}")]
    UnknownBlock(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
