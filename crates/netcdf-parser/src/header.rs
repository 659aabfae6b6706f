//! Parsed header model.
//!
//! Everything here is plain data produced by [`parse_header`](crate::parse_header)
//! and never mutated afterwards.

use serde::Serialize;

use crate::types::NcType;

/// Classic format variant, selected by the fourth magic byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatVersion {
    /// `CDF\x01`: 32-bit variable offsets
    Classic,
    /// `CDF\x02`: 64-bit variable offsets
    Offset64,
}

/// Number of records written so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumRecs {
    Known(u32),
    /// Writer was still streaming when the header was emitted
    Streaming,
}

impl NumRecs {
    /// Record count usable for extents; a streaming header counts as empty.
    pub fn count(&self) -> usize {
        match self {
            Self::Known(n) => *n as usize,
            Self::Streaming => 0,
        }
    }
}

/// Length of a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionLength {
    Fixed(usize),
    /// The unlimited dimension; its length is the header's record count
    Record,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dimension {
    pub name: String,
    pub length: DimensionLength,
}

impl Dimension {
    pub fn is_record(&self) -> bool {
        matches!(self.length, DimensionLength::Record)
    }
}

/// Typed attribute payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Byte(Vec<i8>),
    Text(String),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl AttributeValue {
    /// First numeric element widened to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Byte(v) => v.first().map(|&x| x as f64),
            Self::Short(v) => v.first().map(|&x| x as f64),
            Self::Int(v) => v.first().map(|&x| x as f64),
            Self::Float(v) => v.first().map(|&x| x as f64),
            Self::Double(v) => v.first().copied(),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

/// One entry of the variable table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub name: String,
    /// Indices into [`Header::dimensions`], slowest-varying first
    pub dimensions: Vec<usize>,
    pub attributes: Vec<Attribute>,
    pub nc_type: NcType,
    /// Bytes per variable, or per record for record variables
    pub vsize: u64,
    /// Absolute byte offset of the first element in the file
    pub begin: u64,
    /// First dimension is the record dimension
    pub record: bool,
}

impl Variable {
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        find_attribute(&self.attributes, name)
    }
}

/// Summary of the unlimited dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordDimension {
    pub id: usize,
    pub name: String,
    /// Records present when the header was written
    pub length: usize,
    /// Bytes between the starts of consecutive records
    pub record_step: u64,
}

/// Decoded file header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub version: FormatVersion,
    pub num_records: NumRecs,
    pub dimensions: Vec<Dimension>,
    pub global_attributes: Vec<Attribute>,
    pub variables: Vec<Variable>,
    pub record_dimension: Option<RecordDimension>,
    /// Number of bytes the header occupies at the start of the file
    pub header_len: usize,
}

impl Header {
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn dimension(&self, id: usize) -> Option<&Dimension> {
        self.dimensions.get(id)
    }

    pub fn global_attribute(&self, name: &str) -> Option<&AttributeValue> {
        find_attribute(&self.global_attributes, name)
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }
}

fn find_attribute<'a>(attributes: &'a [Attribute], name: &str) -> Option<&'a AttributeValue> {
    attributes.iter().find(|a| a.name == name).map(|a| &a.value)
}
