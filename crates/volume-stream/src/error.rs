//! Error types for fetching and decoding volumes.

use netcdf_parser::{NcType, NetCdfError};
use thiserror::Error;

/// Errors surfaced by header detection and variable fetches.
///
/// A stream that ends before a header could be decoded is not an error:
/// detection returns `Ok(None)` in that case.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The bytes can never form a NetCDF classic header.
    #[error("malformed NetCDF header: {0}")]
    Header(#[from] NetCdfError),

    /// No variable with this name in the header's variable table.
    #[error("variable not found: {0}")]
    VariableNotFound(String),

    /// The element type has no decoder.
    #[error("unsupported element type: {0}")]
    UnsupportedType(NcType),

    /// The buffer ends before the variable's last element.
    #[error("truncated payload: need {needed} bytes, have {available}")]
    Truncated { needed: u64, available: u64 },

    /// Transport-level failure (connect, body read, timeout).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// A range request was answered with something other than 206.
    #[error("range request for {url} not honored (HTTP {status})")]
    RangeNotHonored { url: String, status: u16 },

    /// Local file I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl FetchError {
    /// Create a VariableNotFound error.
    pub fn variable_not_found(name: impl Into<String>) -> Self {
        Self::VariableNotFound(name.into())
    }

    /// True for failures of the network round trip itself.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Status { .. } | Self::RangeNotHonored { .. }
        )
    }
}

/// Result type for volume-stream operations.
pub type Result<T> = std::result::Result<T, FetchError>;
