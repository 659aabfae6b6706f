//! Choose how a variable's bytes are acquired.

use serde::Serialize;

use crate::locate::VariableDescriptor;

/// The one acquisition path taken for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum AcquisitionPath {
    /// No range support and the bytes are not resident: GET the whole file
    /// and decode at the variable offset.
    FullRefetch,
    /// Every byte is already in the streamed buffer.
    Resident,
    /// GET `bytes=first-last` and decode the body from its start.
    RangeRequest { first: u64, last: u64 },
}

/// Decide the acquisition path, evaluated in the documented order.
///
/// `bytes_received` is the length of the contiguous prefix already buffered.
/// Range mode is enabled by the server's `Accept-Ranges: bytes` or by
/// `force_range`.
pub fn plan_acquisition(
    descriptor: &VariableDescriptor,
    bytes_received: u64,
    accept_ranges: bool,
    force_range: bool,
) -> AcquisitionPath {
    let Some((first, last)) = descriptor.byte_span() else {
        return AcquisitionPath::Resident;
    };
    let range_request = force_range || accept_ranges;

    if !range_request && last >= bytes_received {
        AcquisitionPath::FullRefetch
    } else if last < bytes_received {
        AcquisitionPath::Resident
    } else {
        AcquisitionPath::RangeRequest { first, last }
    }
}
