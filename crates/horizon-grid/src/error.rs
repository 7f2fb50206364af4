//! Error types for the view engine.
//!
//! Absence is never an error here: unknown ids resolve to unknown rows and
//! pending data to loading rows. Errors only come from the asynchronous fetch
//! boundary and from explicit validation of column configuration.

/// Result type alias for view engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the view engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The bulk fetch resolved to an error.
    #[error("Failed to fetch items: {message}")]
    Fetch { message: String },

    /// A configuration entry refers to a column that is not defined.
    #[error("Unknown column key '{key}'")]
    UnknownColumn { key: String },

    /// An order key contains characters outside the ordering alphabet.
    #[error("Invalid column order key '{key}'")]
    InvalidOrderKey { key: String },
}

impl Error {
    /// Create a fetch error.
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create an unknown-column error.
    pub fn unknown_column(key: impl Into<String>) -> Self {
        Self::UnknownColumn { key: key.into() }
    }

    /// Create an invalid order key error.
    pub fn invalid_order_key(key: impl Into<String>) -> Self {
        Self::InvalidOrderKey { key: key.into() }
    }
}
