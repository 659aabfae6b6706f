//! NetCDF classic header decoder.
//!
//! This crate decodes the header of NetCDF classic (`CDF\x01`) and 64-bit
//! offset (`CDF\x02`) files: dimensions, global attributes and the variable
//! table with each variable's type, size and byte offset. It never touches
//! variable data.
//!
//! # Partial input
//!
//! The classic header carries no length prefix. [`parse_header`] accepts any
//! prefix of a file and answers with one of three outcomes:
//!
//! - [`HeaderParse::Complete`]: the header fits in the bytes supplied
//! - [`HeaderParse::Incomplete`]: valid so far, more bytes are needed
//! - `Err(NetCdfError)`: the bytes can never become a valid header
//!
//! This lets a caller accumulating a network stream retry after every chunk
//! without treating "too short" as a failure.
//!
//! NetCDF-4/HDF5 and CDF-5 files are recognised and rejected.

pub mod error;
pub mod header;
pub mod parse;
pub mod types;

pub use error::{NetCdfError, NetCdfResult};
pub use header::{
    Attribute, AttributeValue, Dimension, DimensionLength, FormatVersion, Header, NumRecs,
    RecordDimension, Variable,
};
pub use parse::{parse_header, HeaderParse};
pub use types::NcType;
