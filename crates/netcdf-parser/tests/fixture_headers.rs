//! Header decoding against generated classic files.

use netcdf_parser::{
    parse_header, DimensionLength, FormatVersion, Header, HeaderParse, NcType, NumRecs,
};
use test_utils::{
    mixed_volume_file, temperature_at_offset_100, typed_volumes_file, NcFile, NcFileBuilder,
    NcValues, TEMPERATURE,
};

fn complete(bytes: &[u8]) -> Header {
    parse_header(bytes)
        .unwrap()
        .into_header()
        .expect("header should be complete")
}

#[test]
fn test_every_prefix_is_incomplete() {
    let files: Vec<NcFile> = vec![
        temperature_at_offset_100(),
        mixed_volume_file(),
        typed_volumes_file(),
    ];

    for file in files {
        for n in 0..file.header_len {
            let outcome = parse_header(&file.bytes[..n]).unwrap();
            assert_eq!(outcome, HeaderParse::Incomplete, "prefix of {} bytes", n);
        }
        let header = complete(&file.bytes[..file.header_len]);
        assert_eq!(header.header_len, file.header_len);
        // trailing data does not change the result
        assert_eq!(complete(&file.bytes), header);
    }
}

#[test]
fn test_mixed_file_header() {
    let file = mixed_volume_file();
    let header = complete(&file.bytes);

    assert_eq!(header.version, FormatVersion::Classic);
    assert_eq!(header.num_records, NumRecs::Known(3));
    assert_eq!(header.dimensions.len(), 4);
    assert_eq!(header.dimensions[0].length, DimensionLength::Record);
    assert_eq!(
        header.dimension(2).map(|d| (d.name.as_str(), d.length)),
        Some(("y", DimensionLength::Fixed(3)))
    );

    let record = header.record_dimension.as_ref().unwrap();
    assert_eq!((record.id, record.name.as_str(), record.length), (0, "time", 3));
    assert_eq!(record.record_step, 8);

    let temperature = header.variable(TEMPERATURE).unwrap();
    assert_eq!(temperature.nc_type, NcType::Float);
    assert_eq!(temperature.dimensions, vec![1, 2, 3]);
    assert_eq!(temperature.vsize, 96);
    assert_eq!(temperature.begin, file.layout(TEMPERATURE).begin);
    assert_eq!(
        temperature.attribute("units").and_then(|v| v.as_text()),
        Some("K")
    );
    assert!(!temperature.record);

    let series = header.variable("series").unwrap();
    assert!(series.record);
    assert_eq!(series.nc_type, NcType::Short);
}

#[test]
fn test_offset64_file_header() {
    let file = typed_volumes_file();
    let header = complete(&file.bytes);

    assert_eq!(header.version, FormatVersion::Offset64);
    assert!(header.record_dimension.is_none());
    let types: Vec<NcType> = header.variables.iter().map(|v| v.nc_type).collect();
    assert_eq!(
        types,
        vec![
            NcType::Byte,
            NcType::Short,
            NcType::Int,
            NcType::Float,
            NcType::Double,
            NcType::Char
        ]
    );
    for variable in &header.variables {
        assert_eq!(variable.begin, file.layout(&variable.name).begin);
    }
}

#[test]
fn test_streaming_record_count() {
    let file = NcFileBuilder::new()
        .record_dimension("time")
        .dimension("x", 2)
        .variable("v", &["time", "x"], NcValues::Int(vec![1, 2, 3, 4]))
        .streaming()
        .build();
    let header = complete(&file.bytes);

    assert_eq!(header.num_records, NumRecs::Streaming);
    assert_eq!(header.num_records.count(), 0);
    assert_eq!(header.record_dimension.map(|r| r.length), Some(0));
}
