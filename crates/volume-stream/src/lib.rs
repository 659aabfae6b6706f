//! Streamed NetCDF volumes for ray-marched rendering.
//!
//! This crate fetches a NetCDF classic file over HTTP without downloading it
//! up front. It streams the body until the header decodes, then acquires a
//! single variable's bytes the cheapest way available and decodes them into
//! a dense 3D volume.
//!
//! # Architecture
//!
//! ```text
//! GET url (streaming)
//!      │
//!      ▼
//! detect_header: append chunk ─► parse_header ─► Incomplete? read again
//!      │                                      └─► Complete: session ready
//!      ▼
//! NetCdfSession::fetch_volume(name)
//!      │
//!      ├─► locate_variable: extents, type, byte span
//!      │
//!      ├─► plan_acquisition
//!      │         ├─► FullRefetch:  GET whole file, decode at offset
//!      │         ├─► Resident:     decode from streamed buffer
//!      │         └─► RangeRequest: GET bytes=first-last, decode at 0
//!      │
//!      └─► decode_volume ─► normalize_volume (optional)
//!                                 │
//!                                 ▼
//!                 TextureDescriptor / RayMarchParams
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use volume_stream::{FetchConfig, NetCdfSession, ReqwestTransport, normalize_volume};
//!
//! let transport = Arc::new(ReqwestTransport::new(&FetchConfig::from_env())?);
//! let Some(mut session) = NetCdfSession::open(transport, "https://example.com/ocean.nc").await? else {
//!     return Ok(()); // no header in the stream
//! };
//! let mut volume = session.fetch_volume("temperature", false).await?;
//! normalize_volume(&mut volume);
//! ```

pub mod accumulator;
pub mod config;
pub mod decode;
pub mod detect;
pub mod element;
pub mod error;
pub mod locate;
pub mod normalize;
pub mod render;
pub mod session;
pub mod strategy;
pub mod stream;
pub mod transport;

// Re-export commonly used types at crate root
pub use accumulator::ByteAccumulator;
pub use config::FetchConfig;
pub use decode::{decode_volume, Volume, VolumeData};
pub use detect::detect_header;
pub use element::{element_spec, ElementSpec, NativeKind, TexelType};
pub use error::{FetchError, Result};
pub use locate::{locate_variable, VariableDescriptor};
pub use normalize::normalize_volume;
pub use render::{RayMarchParams, RenderConfig, RenderStyle, TextureDescriptor};
pub use session::NetCdfSession;
pub use strategy::{plan_acquisition, AcquisitionPath};
pub use stream::{ChunkRead, StreamState};
pub use transport::{ChunkStream, HttpTransport, ReqwestTransport, StreamingResponse};

pub use netcdf_parser::{Header, NcType};
