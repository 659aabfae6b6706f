//! Header decoding over a possibly truncated byte prefix.
//!
//! The header of a classic file has no length prefix, so callers feeding a
//! growing buffer need to tell "not enough bytes yet" apart from "this is not
//! a NetCDF file". Every read goes through [`Cursor`], which reports running
//! off the end of the buffer as [`Fail::Incomplete`]; structural problems are
//! reported as [`NetCdfError`].

use tracing::trace;

use crate::error::{NetCdfError, NetCdfResult};
use crate::header::{
    Attribute, AttributeValue, Dimension, DimensionLength, FormatVersion, Header, NumRecs,
    RecordDimension, Variable,
};
use crate::types::NcType;

const MAGIC: &[u8; 3] = b"CDF";
const HDF5_SIGNATURE_BYTE: u8 = 0x89;

const STREAMING: u32 = 0xFFFF_FFFF;
const ABSENT: u32 = 0x0000_0000;
const NC_DIMENSION: u32 = 0x0000_000A;
const NC_VARIABLE: u32 = 0x0000_000B;
const NC_ATTRIBUTE: u32 = 0x0000_000C;

/// Outcome of a header decode attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderParse {
    /// The buffer holds a complete header (and possibly more).
    Complete(Header),
    /// The buffer is a valid prefix so far but ends before the header does.
    Incomplete,
}

impl HeaderParse {
    pub fn into_header(self) -> Option<Header> {
        match self {
            Self::Complete(header) => Some(header),
            Self::Incomplete => None,
        }
    }
}

/// Attempt to decode a classic header from the start of `data`.
///
/// Returns `Ok(HeaderParse::Incomplete)` for every strict prefix of a valid
/// header and `Ok(HeaderParse::Complete)` once `data` reaches the header end.
/// Trailing bytes (variable data) are ignored.
pub fn parse_header(data: &[u8]) -> NetCdfResult<HeaderParse> {
    match decode(data) {
        Ok(header) => {
            trace!(
                header_len = header.header_len,
                dimensions = header.dimensions.len(),
                variables = header.variables.len(),
                "Decoded NetCDF header"
            );
            Ok(HeaderParse::Complete(header))
        }
        Err(Fail::Incomplete) => Ok(HeaderParse::Incomplete),
        Err(Fail::Malformed(e)) => Err(e),
    }
}

enum Fail {
    Incomplete,
    Malformed(NetCdfError),
}

impl From<NetCdfError> for Fail {
    fn from(err: NetCdfError) -> Self {
        Self::Malformed(err)
    }
}

type Step<T> = Result<T, Fail>;

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Step<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or_else(|| NetCdfError::invalid_format("length overflows address space"))?;
        if end > self.data.len() {
            return Err(Fail::Incomplete);
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u32(&mut self) -> Step<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Step<u64> {
        let b = self.take(8)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }

    fn count(&mut self) -> Step<usize> {
        Ok(self.u32()? as usize)
    }

    /// Read `n` bytes followed by zero padding up to a 4-byte boundary.
    fn padded(&mut self, n: usize) -> Step<&'a [u8]> {
        let bytes = self.take(n)?;
        self.take((4 - n % 4) % 4)?;
        Ok(bytes)
    }

    fn name(&mut self) -> Step<String> {
        let len = self.count()?;
        let bytes = self.padded(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| NetCdfError::invalid_format("name is not valid UTF-8").into())
    }

    /// Read a list header and return its element count.
    fn list(&mut self, tag: u32, what: &str) -> Step<usize> {
        let found = self.u32()?;
        let count = self.count()?;
        if found == ABSENT {
            if count != 0 {
                return Err(NetCdfError::invalid_format(format!(
                    "absent {} list with non-zero count {}",
                    what, count
                ))
                .into());
            }
            return Ok(0);
        }
        if found != tag {
            return Err(NetCdfError::invalid_format(format!(
                "expected {} list tag {:#x}, found {:#x}",
                what, tag, found
            ))
            .into());
        }
        Ok(count)
    }
}

fn decode(data: &[u8]) -> Step<Header> {
    let mut cursor = Cursor::new(data);

    let version = read_magic(&mut cursor)?;
    let num_records = match cursor.u32()? {
        STREAMING => NumRecs::Streaming,
        n => NumRecs::Known(n),
    };

    let dimensions = read_dimensions(&mut cursor)?;
    let global_attributes = read_attributes(&mut cursor)?;

    let record_id = dimensions.iter().position(Dimension::is_record);
    let variables = read_variables(&mut cursor, version, dimensions.len(), record_id)?;

    let record_dimension = record_id.map(|id| RecordDimension {
        id,
        name: dimensions[id].name.clone(),
        length: num_records.count(),
        record_step: variables
            .iter()
            .filter(|v| v.record)
            .map(|v| v.vsize)
            .sum(),
    });

    Ok(Header {
        version,
        num_records,
        dimensions,
        global_attributes,
        variables,
        record_dimension,
        header_len: cursor.pos,
    })
}

fn read_magic(cursor: &mut Cursor<'_>) -> Step<FormatVersion> {
    let available = &cursor.data[..cursor.data.len().min(4)];

    if available.first() == Some(&HDF5_SIGNATURE_BYTE) {
        return Err(NetCdfError::UnsupportedFormat("NetCDF-4/HDF5 container".to_string()).into());
    }
    let n = available.len().min(MAGIC.len());
    if available[..n] != MAGIC[..n] {
        return Err(NetCdfError::InvalidMagic(available.to_vec()).into());
    }

    let magic = cursor.take(4)?;
    match magic[3] {
        1 => Ok(FormatVersion::Classic),
        2 => Ok(FormatVersion::Offset64),
        5 => Err(NetCdfError::UnsupportedFormat("CDF-5 (64-bit data)".to_string()).into()),
        other => Err(NetCdfError::invalid_format(format!("unknown version byte {}", other)).into()),
    }
}

fn read_dimensions(cursor: &mut Cursor<'_>) -> Step<Vec<Dimension>> {
    let count = cursor.list(NC_DIMENSION, "dimension")?;
    let mut dimensions: Vec<Dimension> = Vec::new();

    for _ in 0..count {
        let name = cursor.name()?;
        let length = match cursor.count()? {
            0 => DimensionLength::Record,
            n => DimensionLength::Fixed(n),
        };
        if length == DimensionLength::Record && dimensions.iter().any(Dimension::is_record) {
            return Err(NetCdfError::invalid_format(format!(
                "second unlimited dimension '{}'",
                name
            ))
            .into());
        }
        dimensions.push(Dimension { name, length });
    }

    Ok(dimensions)
}

fn read_attributes(cursor: &mut Cursor<'_>) -> Step<Vec<Attribute>> {
    let count = cursor.list(NC_ATTRIBUTE, "attribute")?;
    let mut attributes = Vec::new();

    for _ in 0..count {
        let name = cursor.name()?;
        let nc_type = NcType::from_code(cursor.u32()?)?;
        let nelems = cursor.count()?;
        let len = nelems
            .checked_mul(nc_type.size())
            .ok_or_else(|| NetCdfError::invalid_format(format!("attribute '{}' too large", name)))?;
        let bytes = cursor.padded(len)?;
        attributes.push(Attribute {
            name,
            value: attribute_value(nc_type, bytes),
        });
    }

    Ok(attributes)
}

fn attribute_value(nc_type: NcType, bytes: &[u8]) -> AttributeValue {
    match nc_type {
        NcType::Byte => AttributeValue::Byte(bytes.iter().map(|&b| b as i8).collect()),
        NcType::Char => {
            let text = String::from_utf8_lossy(bytes);
            AttributeValue::Text(text.trim_end_matches('\0').to_string())
        }
        NcType::Short => AttributeValue::Short(
            bytes
                .chunks_exact(2)
                .map(|c| i16::from_be_bytes([c[0], c[1]]))
                .collect(),
        ),
        NcType::Int => AttributeValue::Int(
            bytes
                .chunks_exact(4)
                .map(|c| i32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
        NcType::Float => AttributeValue::Float(
            bytes
                .chunks_exact(4)
                .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
        NcType::Double => AttributeValue::Double(
            bytes
                .chunks_exact(8)
                .map(|c| f64::from_be_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                .collect(),
        ),
    }
}

fn read_variables(
    cursor: &mut Cursor<'_>,
    version: FormatVersion,
    dimension_count: usize,
    record_id: Option<usize>,
) -> Step<Vec<Variable>> {
    let count = cursor.list(NC_VARIABLE, "variable")?;
    let mut variables = Vec::new();

    for _ in 0..count {
        let name = cursor.name()?;
        let ndims = cursor.count()?;
        let mut dimensions = Vec::new();
        for _ in 0..ndims {
            let id = cursor.count()?;
            if id >= dimension_count {
                return Err(NetCdfError::invalid_format(format!(
                    "variable '{}' references dimension {} of {}",
                    name, id, dimension_count
                ))
                .into());
            }
            dimensions.push(id);
        }
        let attributes = read_attributes(cursor)?;
        let nc_type = NcType::from_code(cursor.u32()?)?;
        let vsize = cursor.u32()? as u64;
        let begin = match version {
            FormatVersion::Classic => cursor.u32()? as u64,
            FormatVersion::Offset64 => cursor.u64()?,
        };
        let record = record_id.is_some() && dimensions.first().copied() == record_id;

        variables.push(Variable {
            name,
            dimensions,
            attributes,
            nc_type,
            vsize,
            begin,
            record,
        });
    }

    Ok(variables)
}
