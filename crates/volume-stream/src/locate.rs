//! Resolve a variable name to its shape and byte span.

use netcdf_parser::{DimensionLength, Header, NcType, Variable};
use serde::Serialize;

use crate::error::{FetchError, Result};

/// Shape, type and location of one variable in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableDescriptor {
    pub name: String,
    pub x_length: usize,
    pub y_length: usize,
    pub z_length: usize,
    pub element_type: NcType,
    /// Absolute offset of the first byte in the file
    pub offset: u64,
    /// Bytes from the first element to the last; for record variables this
    /// spans every known record, including other variables' interleaved data
    pub byte_len: u64,
    /// Varies along the record dimension (x)
    pub record: bool,
    /// Bytes between the starts of consecutive records; 0 when not a record variable
    pub record_step: u64,
}

impl VariableDescriptor {
    /// Total number of elements, `x * y * z`.
    pub fn size(&self) -> usize {
        self.x_length * self.y_length * self.z_length
    }

    /// Inclusive `(first, last)` byte indices, or `None` for an empty variable.
    pub fn byte_span(&self) -> Option<(u64, u64)> {
        if self.byte_len == 0 {
            return None;
        }
        Some((self.offset, self.offset + self.byte_len - 1))
    }
}

/// Find `name` in the header and resolve its extents.
///
/// The first three dimension references give x, y and z. Missing ones
/// default to 1; the record dimension contributes its current length.
pub fn locate_variable(header: &Header, name: &str) -> Result<VariableDescriptor> {
    let variable = header
        .variable(name)
        .ok_or_else(|| FetchError::variable_not_found(name))?;

    let x_length = extent(header, variable, 0);
    let record_step = match (&header.record_dimension, variable.record) {
        (Some(rec), true) => rec.record_step,
        _ => 0,
    };
    let byte_len = if variable.record {
        record_span(x_length as u64, record_step, variable.vsize)
    } else {
        variable.vsize
    };

    Ok(VariableDescriptor {
        name: variable.name.clone(),
        x_length,
        y_length: extent(header, variable, 1),
        z_length: extent(header, variable, 2),
        element_type: variable.nc_type,
        offset: variable.begin,
        byte_len,
        record: variable.record,
        record_step,
    })
}

/// Bytes from the start of record 0 to the end of the last record's slice.
fn record_span(records: u64, record_step: u64, vsize: u64) -> u64 {
    match records {
        0 => 0,
        n => (n - 1).saturating_mul(record_step).saturating_add(vsize),
    }
}

fn extent(header: &Header, variable: &Variable, index: usize) -> usize {
    let Some(&id) = variable.dimensions.get(index) else {
        return 1;
    };
    match header.dimension(id).map(|d| d.length) {
        Some(DimensionLength::Fixed(n)) => n,
        Some(DimensionLength::Record) => header
            .record_dimension
            .as_ref()
            .map_or(0, |rec| rec.length),
        // the parser rejects out-of-range ids
        None => 1,
    }
}
