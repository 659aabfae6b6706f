//! Per-type decode and render policy.
//!
//! Decoding, normalization and texture layout all depend on the element
//! type. They look it up here instead of each matching on the type, so the
//! three can not disagree.

use netcdf_parser::NcType;
use serde::Serialize;

/// In-memory representation of decoded elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NativeKind {
    /// 8-bit values kept at native width
    Byte,
    /// Everything wider, converted to f32
    Float,
}

/// Texel type the renderer uploads for this element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TexelType {
    UnsignedByte,
    Float,
}

/// Reads one big-endian element from a slice of exactly `width` bytes.
pub type ReadFn = fn(&[u8]) -> f64;

#[derive(Debug, Clone, Copy)]
pub struct ElementSpec {
    pub element_type: NcType,
    /// Bytes per element on disk
    pub width: usize,
    pub native: NativeKind,
    pub texel: TexelType,
    /// Values are rescaled to [0, 1] before upload
    pub normalize: bool,
    /// `None` for types the decoder rejects
    pub read: Option<ReadFn>,
}

impl ElementSpec {
    pub fn is_decodable(&self) -> bool {
        self.read.is_some()
    }
}

const BYTE: ElementSpec = ElementSpec {
    element_type: NcType::Byte,
    width: 1,
    native: NativeKind::Byte,
    texel: TexelType::UnsignedByte,
    normalize: false,
    read: Some(read_i8),
};

const CHAR: ElementSpec = ElementSpec {
    element_type: NcType::Char,
    width: 1,
    native: NativeKind::Byte,
    texel: TexelType::UnsignedByte,
    normalize: false,
    read: None,
};

const SHORT: ElementSpec = ElementSpec {
    element_type: NcType::Short,
    width: 2,
    native: NativeKind::Float,
    texel: TexelType::Float,
    normalize: true,
    read: Some(read_i16),
};

const INT: ElementSpec = ElementSpec {
    element_type: NcType::Int,
    width: 4,
    native: NativeKind::Float,
    texel: TexelType::Float,
    normalize: true,
    read: Some(read_i32),
};

const FLOAT: ElementSpec = ElementSpec {
    element_type: NcType::Float,
    width: 4,
    native: NativeKind::Float,
    texel: TexelType::Float,
    normalize: true,
    read: Some(read_f32),
};

// No double texture format; widened values are narrowed to f32.
const DOUBLE: ElementSpec = ElementSpec {
    element_type: NcType::Double,
    width: 8,
    native: NativeKind::Float,
    texel: TexelType::Float,
    normalize: true,
    read: Some(read_f64),
};

/// Look up the policy for an element type.
pub fn element_spec(element_type: NcType) -> &'static ElementSpec {
    match element_type {
        NcType::Byte => &BYTE,
        NcType::Char => &CHAR,
        NcType::Short => &SHORT,
        NcType::Int => &INT,
        NcType::Float => &FLOAT,
        NcType::Double => &DOUBLE,
    }
}

fn read_i8(b: &[u8]) -> f64 {
    b[0] as i8 as f64
}

fn read_i16(b: &[u8]) -> f64 {
    i16::from_be_bytes([b[0], b[1]]) as f64
}

fn read_i32(b: &[u8]) -> f64 {
    i32::from_be_bytes([b[0], b[1], b[2], b[3]]) as f64
}

fn read_f32(b: &[u8]) -> f64 {
    f32::from_be_bytes([b[0], b[1], b[2], b[3]]) as f64
}

fn read_f64(b: &[u8]) -> f64 {
    f64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}
