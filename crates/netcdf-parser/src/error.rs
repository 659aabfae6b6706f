//! Error types for NetCDF header decoding.

use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Errors that no amount of additional input can fix.
///
/// A header that is merely cut short is not an error; see
/// [`HeaderParse::Incomplete`](crate::HeaderParse::Incomplete).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetCdfError {
    /// The leading bytes are not a NetCDF classic signature
    #[error("Invalid magic bytes: {0:02x?}")]
    InvalidMagic(Vec<u8>),

    /// Recognised container we deliberately do not read (NetCDF-4/HDF5, CDF-5)
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Structural problem inside the header
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Type code outside the classic type set
    #[error("Unknown NetCDF type code: {0}")]
    UnknownType(u32),
}

impl NetCdfError {
    /// Create an InvalidFormat error.
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }
}
