//! Ready-made NetCDF files for pipeline tests.
//!
//! Each fixture documents the layout facts tests rely on (header length,
//! variable offsets) so assertions can be written against them directly.

use crate::generators::{create_ramp_volume, NcFile, NcFileBuilder, NcValues};

/// Variable name used by the single-variable fixtures.
pub const TEMPERATURE: &str = "temperature";

/// One float variable `temperature(x)` with `x = 100`.
///
/// Layout: header is 88 bytes, data starts at offset 100, 400 bytes of data
/// (first byte 100, last byte 499), file length 500. Values are the ramp
/// `0.0, 1.0, ..., 99.0`.
pub fn temperature_at_offset_100() -> NcFile {
    NcFileBuilder::new()
        .dimension("x", 100)
        .variable(
            TEMPERATURE,
            &["x"],
            NcValues::Float(create_ramp_volume(100, 1, 1, 0.0, 1.0)),
        )
        .data_start(100)
        .build()
}

/// A 4x3x2 float volume plus a byte mask and a record variable.
///
/// - `temperature(x, y, z)`: ramp from 250.0 in steps of 0.5, with `units = "K"`
/// - `mask(x, y, z)`: bytes `-12..12`
/// - `series(time, x)`: record variable, 3 records of 4 shorts
pub fn mixed_volume_file() -> NcFile {
    NcFileBuilder::new()
        .record_dimension("time")
        .dimension("x", 4)
        .dimension("y", 3)
        .dimension("z", 2)
        .global_attribute("title", NcValues::text("synthetic volume"))
        .variable(
            TEMPERATURE,
            &["x", "y", "z"],
            NcValues::Float(create_ramp_volume(4, 3, 2, 250.0, 0.5)),
        )
        .variable_attribute("units", NcValues::text("K"))
        .variable(
            "mask",
            &["x", "y", "z"],
            NcValues::Byte((-12..12).collect()),
        )
        .variable(
            "series",
            &["time", "x"],
            NcValues::Short((0..12).collect()),
        )
        .build()
}

/// Every supported numeric type as a 2x2x2 volume holding `-3..5`.
pub fn typed_volumes_file() -> NcFile {
    let values: Vec<i32> = (-3..5).collect();
    NcFileBuilder::new()
        .offset64()
        .dimension("x", 2)
        .dimension("y", 2)
        .dimension("z", 2)
        .variable(
            "v_byte",
            &["x", "y", "z"],
            NcValues::Byte(values.iter().map(|&v| v as i8).collect()),
        )
        .variable(
            "v_short",
            &["x", "y", "z"],
            NcValues::Short(values.iter().map(|&v| v as i16).collect()),
        )
        .variable("v_int", &["x", "y", "z"], NcValues::Int(values.clone()))
        .variable(
            "v_float",
            &["x", "y", "z"],
            NcValues::Float(values.iter().map(|&v| v as f32).collect()),
        )
        .variable(
            "v_double",
            &["x", "y", "z"],
            NcValues::Double(values.iter().map(|&v| v as f64).collect()),
        )
        .variable(
            "v_char",
            &["x", "y", "z"],
            NcValues::Char(b"abcdefgh".to_vec()),
        )
        .build()
}
