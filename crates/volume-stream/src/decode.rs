//! Decode a variable's raw bytes into a dense volume.

use netcdf_parser::NcType;
use serde::Serialize;
use tracing::{debug, warn};

use crate::element::{element_spec, NativeKind};
use crate::error::{FetchError, Result};
use crate::locate::VariableDescriptor;

/// Decoded element storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VolumeData {
    /// 8-bit elements at native width
    Byte(Vec<i8>),
    /// Wider integer and floating types, converted to f32
    Float(Vec<f32>),
}

impl VolumeData {
    pub fn len(&self) -> usize {
        match self {
            Self::Byte(v) => v.len(),
            Self::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            Self::Float(v) => Some(v),
            Self::Byte(_) => None,
        }
    }

    pub fn as_i8(&self) -> Option<&[i8]> {
        match self {
            Self::Byte(v) => Some(v),
            Self::Float(_) => None,
        }
    }
}

/// Dense 3D array plus its shape and value bounds.
///
/// Only produced by a full decode pass, so `min`/`max` always describe every
/// element (NaN elements are ignored).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Volume {
    pub(crate) variable: String,
    pub(crate) element_type: NcType,
    pub(crate) x_length: usize,
    pub(crate) y_length: usize,
    pub(crate) z_length: usize,
    pub(crate) data: VolumeData,
    pub(crate) min: f64,
    pub(crate) max: f64,
    pub(crate) normalized: bool,
}

impl Volume {
    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn element_type(&self) -> NcType {
        self.element_type
    }

    /// `(x, y, z)` extents.
    pub fn extents(&self) -> (usize, usize, usize) {
        (self.x_length, self.y_length, self.z_length)
    }

    /// Element count, equal to `x * y * z` and to `data().len()`.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &VolumeData {
        &self.data
    }

    /// Smallest decoded value; `+inf` for an empty volume.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest decoded value; `-inf` for an empty volume.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// True once [`normalize_volume`](crate::normalize_volume) rescaled the data.
    pub fn is_normalized(&self) -> bool {
        self.normalized
    }
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min: f64,
    max: f64,
}

impl Bounds {
    fn new() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn observe(&mut self, v: f64) {
        if v < self.min {
            self.min = v;
        }
        if v > self.max {
            self.max = v;
        }
    }
}

/// Decode `descriptor.size()` big-endian elements starting at `offset`.
///
/// `offset` is the variable's file offset when `buffer` holds the file from
/// its first byte, and 0 when `buffer` is the body of a range request.
///
/// Record variables are read one record at a time, `record_step` apart, and
/// only the whole records present in `buffer` are decoded. The volume's x
/// extent is the number of records actually read.
pub fn decode_volume(
    buffer: &[u8],
    descriptor: &VariableDescriptor,
    offset: u64,
) -> Result<Volume> {
    let spec = element_spec(descriptor.element_type);
    let read = spec
        .read
        .ok_or(FetchError::UnsupportedType(descriptor.element_type))?;

    let (x_length, spans) = if descriptor.record {
        let (records, spans) = record_spans(buffer.len(), descriptor, spec.width, offset);
        warn!(
            variable = %descriptor.name,
            records,
            known_records = descriptor.x_length,
            "Decoding of record data is not fully supported yet, using whole records present"
        );
        (records, spans)
    } else {
        let needed = (descriptor.size() as u64)
            .checked_mul(spec.width as u64)
            .and_then(|n| n.checked_add(offset))
            .ok_or(FetchError::Truncated {
                needed: u64::MAX,
                available: buffer.len() as u64,
            })?;
        if needed > buffer.len() as u64 {
            return Err(FetchError::Truncated {
                needed,
                available: buffer.len() as u64,
            });
        }
        (descriptor.x_length, vec![(offset as usize, needed as usize)])
    };
    let size = x_length * descriptor.y_length * descriptor.z_length;

    let mut bounds = Bounds::new();
    let elements = spans
        .iter()
        .flat_map(|&(start, end)| buffer[start..end].chunks_exact(spec.width))
        .map(read);
    let data = match spec.native {
        NativeKind::Byte => VolumeData::Byte(
            elements
                .map(|v| {
                    let b = v as i8;
                    bounds.observe(b as f64);
                    b
                })
                .collect(),
        ),
        NativeKind::Float => VolumeData::Float(
            elements
                .map(|v| {
                    let f = v as f32;
                    bounds.observe(f as f64);
                    f
                })
                .collect(),
        ),
    };

    debug!(
        variable = %descriptor.name,
        element_type = %descriptor.element_type,
        size,
        min = bounds.min,
        max = bounds.max,
        "Decoded volume"
    );

    Ok(Volume {
        variable: descriptor.name.clone(),
        element_type: descriptor.element_type,
        x_length,
        y_length: descriptor.y_length,
        z_length: descriptor.z_length,
        data,
        min: bounds.min,
        max: bounds.max,
        normalized: false,
    })
}

/// Byte ranges of the leading whole records that fit in the buffer.
fn record_spans(
    buffer_len: usize,
    descriptor: &VariableDescriptor,
    width: usize,
    offset: u64,
) -> (usize, Vec<(usize, usize)>) {
    let per_record = (descriptor.y_length * descriptor.z_length * width) as u64;
    let mut spans = Vec::new();

    for record in 0..descriptor.x_length as u64 {
        let span = record
            .checked_mul(descriptor.record_step)
            .and_then(|s| s.checked_add(offset))
            .and_then(|start| start.checked_add(per_record).map(|end| (start, end)));
        match span {
            Some((start, end)) if end <= buffer_len as u64 => {
                spans.push((start as usize, end as usize));
            }
            _ => break,
        }
    }

    (spans.len(), spans)
}
