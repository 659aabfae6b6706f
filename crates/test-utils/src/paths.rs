//! Writing fixtures to disk for tests that read local files.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::generators::NcFile;

/// Write `file` to a fresh temporary `.nc` file that is removed on drop.
pub fn write_temp_nc(file: &NcFile) -> NamedTempFile {
    let mut tmp = tempfile::Builder::new()
        .suffix(".nc")
        .tempfile()
        .expect("create temp file");
    tmp.write_all(&file.bytes).expect("write temp file");
    tmp.flush().expect("flush temp file");
    tmp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::temperature_at_offset_100;

    #[test]
    fn test_write_temp_nc() {
        let file = temperature_at_offset_100();
        let tmp = write_temp_nc(&file);
        let read = std::fs::read(tmp.path()).unwrap();
        assert_eq!(read, file.bytes);
        assert!(tmp.path().extension().is_some_and(|e| e == "nc"));
    }
}
