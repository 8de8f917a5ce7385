//! Error taxonomy shared by every codec, validator, and client operation.

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Everything that can go wrong between user input and the backend.
///
/// Validation variants are produced before any backend call is made.
/// `BackendRejected` carries the backend's own message untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Odd length or non-hex character in a hex string.
    #[error("Malformed hex: {0}")]
    MalformedHex(String),

    /// A fixed-size field decoded to the wrong number of bytes.
    #[error("{field} must be exactly {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A raw block header that is not 80 bytes long.
    #[error("Block header must be 80 bytes, got {0}")]
    InvalidHeaderLength(usize),

    /// Bad start height or an end height below the start.
    #[error("Invalid height range: {0}")]
    InvalidRange(String),

    /// Non-positive, unparseable, or out-of-range BTC amount.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A send source selector that names no known address type.
    #[error("Invalid address type: {0}")]
    UnknownSendSource(String),

    /// An address field that is empty after trimming.
    #[error("Please enter a {0}")]
    MissingAddress(&'static str),

    /// The backend answered with a value of the wrong type or shape.
    #[error("Unexpected response shape: {0}")]
    UnexpectedResponseShape(String),

    /// The backend itself reported a failure.
    #[error("{0}")]
    BackendRejected(String),
}

impl Error {
    /// Stable identifier for the error kind, independent of the message.
    pub fn code(&self) -> &'static str {
        match self {
            Error::MalformedHex(_) => "MalformedHex",
            Error::InvalidLength { .. } => "InvalidLength",
            Error::InvalidHeaderLength(_) => "InvalidHeaderLength",
            Error::InvalidRange(_) => "InvalidRange",
            Error::InvalidAmount(_) => "InvalidAmount",
            Error::UnknownSendSource(_) => "UnknownSendSource",
            Error::MissingAddress(_) => "MissingAddress",
            Error::UnexpectedResponseShape(_) => "UnexpectedResponseShape",
            Error::BackendRejected(_) => "BackendRejected",
        }
    }

    /// Whether the error was raised locally, before reaching the backend.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            Error::UnexpectedResponseShape(_) | Error::BackendRejected(_)
        )
    }
}
