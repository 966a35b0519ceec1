//! Error types for solizard

use alloy::primitives::Address;
use thiserror::Error;

/// Result type alias for solizard operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading interfaces, encoding input or talking to a node
#[derive(Debug, Error)]
pub enum Error {
    /// An interface file could not be parsed into method descriptors
    #[error("Failed to load interface '{name}': {reason}")]
    InterfaceLoad { name: String, reason: String },

    /// The type is valid ABI but cannot be entered interactively (fixed-point, function)
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// Input does not fit the expected type
    #[error("Type mismatch for {expected}: {reason}")]
    TypeMismatch { expected: String, reason: String },

    /// Input is not a well-formed literal
    #[error("Malformed {kind} literal '{input}'")]
    MalformedLiteral { kind: &'static str, input: String },

    /// Element count of an array or tuple literal differs from the declared count
    #[error("Expected {expected} elements for {ty}, got {actual}")]
    ArityMismatch {
        ty: String,
        expected: usize,
        actual: usize,
    },

    /// A value could not be encoded into its argument slot
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Return data could not be decoded against the method outputs
    #[error("Decoding error: {0}")]
    Decoding(String),

    /// Failed to reach the RPC endpoint
    #[error("Connection to {endpoint} failed: {reason}")]
    Connection { endpoint: String, reason: String },

    /// Operator input failed validation
    #[error("Invalid input: {0}")]
    Validation(String),

    /// No contract code deployed at the given address
    #[error("No contract code at {0}")]
    NoCode(Address),

    /// Read-only call failed on the node
    #[error("Contract call failed: {0}")]
    ChainCall(String),

    /// Fetching nonce/gas price or sending the transaction failed
    #[error("Failed to submit transaction: {0}")]
    Submission(String),

    /// Signature generation failed
    #[error("Failed to sign: {0}")]
    Signing(String),

    /// The prompt surface failed or was cancelled
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true for errors the session recovers from by prompting again
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Connection { .. }
                | Error::Validation(_)
                | Error::NoCode(_)
                | Error::TypeMismatch { .. }
                | Error::MalformedLiteral { .. }
                | Error::ArityMismatch { .. }
                | Error::UnsupportedType(_)
        )
    }
}

impl From<alloy::signers::Error> for Error {
    fn from(err: alloy::signers::Error) -> Self {
        Error::Signing(err.to_string())
    }
}

impl From<alloy_dyn_abi::Error> for Error {
    fn from(err: alloy_dyn_abi::Error) -> Self {
        Error::Decoding(err.to_string())
    }
}
