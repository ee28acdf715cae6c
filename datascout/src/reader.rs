use serde_json::Value;
use std::path::Path;
use tracing::{trace, warn};

use crate::config::EncodingMode;
use crate::errors::{ScanError, ScanResult};
use crate::record::{FileFormat, Record};

/// Decodes bytes into a String according to the encoding mode
fn decode_bytes(bytes: Vec<u8>, path: &Path, encoding_mode: EncodingMode) -> ScanResult<String> {
    match encoding_mode {
        EncodingMode::FailFast => {
            String::from_utf8(bytes).map_err(|e| ScanError::encoding_error(path, e))
        }
        EncodingMode::Lossy => {
            let cow = String::from_utf8_lossy(&bytes);
            // Owned means at least one sequence was replaced
            if let std::borrow::Cow::Owned(_) = cow {
                warn!("Invalid UTF-8 replaced in file: {}", path.display());
            }
            Ok(cow.into_owned())
        }
    }
}

/// Reads a whole file as text
pub fn read_text(path: &Path, encoding_mode: EncodingMode) -> ScanResult<String> {
    let bytes = std::fs::read(path).map_err(|e| ScanError::from_io(path, e))?;
    decode_bytes(bytes, path, encoding_mode)
}

/// Reads the records of one file, parsing it as `format`.
///
/// - JSON: the document must parse as a whole. A top-level array yields its
///   elements, any other value is a single item.
/// - CSV: every row including the header, in file order. Rows the CSV reader
///   rejects are skipped.
/// - Text: one record per line, line terminator removed.
pub fn read_records(
    path: &Path,
    format: FileFormat,
    encoding_mode: EncodingMode,
) -> ScanResult<Vec<Record>> {
    trace!("Reading {} records from {}", format, path.display());
    let contents = read_text(path, encoding_mode)?;

    let records = match format {
        FileFormat::Json => parse_json(&contents, path)?,
        FileFormat::Csv => parse_csv(&contents, path),
        FileFormat::Text | FileFormat::Other => contents
            .lines()
            .map(|line| Record::Line(line.to_string()))
            .collect(),
    };

    Ok(records)
}

fn parse_json(contents: &str, path: &Path) -> ScanResult<Vec<Record>> {
    let document: Value = serde_json::from_str(contents)
        .map_err(|e| ScanError::parse_error(path, e.to_string()))?;

    Ok(match document {
        Value::Array(items) => items.into_iter().map(Record::Json).collect(),
        other => vec![Record::Json(other)],
    })
}

fn parse_csv(contents: &str, path: &Path) -> Vec<Record> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        match result {
            Ok(record) => rows.push(Record::Row(record.iter().map(String::from).collect())),
            Err(e) => trace!("Skipping row {} of {}: {}", index, path.display(), e),
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_json_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.json");
        fs::write(&path, r#"[{"x": 1}, {"x": 2}]"#).unwrap();

        let records = read_records(&path, FileFormat::Json, EncodingMode::FailFast).unwrap();
        assert_eq!(
            records,
            vec![Record::Json(json!({"x": 1})), Record::Json(json!({"x": 2}))]
        );
    }

    #[test]
    fn test_read_json_single_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("item.json");
        fs::write(&path, r#"{"device": "A"}"#).unwrap();

        let records = read_records(&path, FileFormat::Json, EncodingMode::FailFast).unwrap();
        assert_eq!(records, vec![Record::Json(json!({"device": "A"}))]);
    }

    #[test]
    fn test_malformed_json_fails_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"[{"x": 1},"#).unwrap();

        let err = read_records(&path, FileFormat::Json, EncodingMode::FailFast).unwrap_err();
        assert!(matches!(err, ScanError::ParseError { .. }));
    }

    #[test]
    fn test_read_csv_keeps_header_and_ragged_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        fs::write(&path, "id,device,value\n1,A,10\n2,\"B, north\"\n").unwrap();

        let records = read_records(&path, FileFormat::Csv, EncodingMode::FailFast).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            Record::Row(vec!["id".into(), "device".into(), "value".into()])
        );
        assert_eq!(records[2], Record::Row(vec!["2".into(), "B, north".into()]));
    }

    #[test]
    fn test_read_text_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.log");
        fs::write(&path, "first\r\nsecond\n\nfourth").unwrap();

        let records = read_records(&path, FileFormat::Other, EncodingMode::FailFast).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[1], Record::Line("second".to_string()));
        assert_eq!(records[3], Record::Line("fourth".to_string()));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.txt");
        let err = read_records(&path, FileFormat::Text, EncodingMode::FailFast).unwrap_err();
        assert!(matches!(err, ScanError::FileNotFound(_)));
    }

    #[test]
    fn test_encoding_modes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, b"caf\xe9 reading\n").unwrap();

        let err = read_records(&path, FileFormat::Text, EncodingMode::FailFast).unwrap_err();
        assert!(matches!(err, ScanError::EncodingError { .. }));

        let records = read_records(&path, FileFormat::Text, EncodingMode::Lossy).unwrap();
        assert_eq!(records, vec![Record::Line("caf\u{FFFD} reading".to_string())]);
    }
}
