use std::path::Path;
use tracing::trace;

use super::matcher::PatternMatcher;
use crate::config::EncodingMode;
use crate::errors::ScanResult;
use crate::events::{ScanEvent, ScanObserver};
use crate::reader::read_records;
use crate::record::{FileFormat, Record};
use crate::results::FileResult;

/// Searches single files with a compiled pattern
#[derive(Debug)]
pub struct FileProcessor {
    matcher: PatternMatcher,
    encoding_mode: EncodingMode,
}

impl FileProcessor {
    /// Creates a new FileProcessor with the given pattern matcher
    pub fn new(matcher: PatternMatcher, encoding_mode: EncodingMode) -> Self {
        Self {
            matcher,
            encoding_mode,
        }
    }

    /// Processes a file and returns the records it keeps.
    ///
    /// The first row of a CSV file is kept unconditionally; later rows, JSON
    /// items and lines are kept when they match. Each match is reported to
    /// `observer` as soon as it is found.
    pub fn process_file(
        &self,
        path: &Path,
        observer: &mut dyn ScanObserver,
    ) -> ScanResult<FileResult> {
        let format = FileFormat::from_path(path);
        trace!("Processing {} file: {}", format, path.display());

        let mut records = read_records(path, format, self.encoding_mode)?.into_iter();
        let mut result = FileResult {
            path: path.to_path_buf(),
            ..Default::default()
        };

        if format == FileFormat::Csv {
            if let Some(header) = records.next() {
                result.records.push(header);
            }
        }

        for record in records {
            if !self.matcher.is_match(&record) {
                continue;
            }
            let record = record.into_stored();
            observer.on_event(&ScanEvent::Match {
                path: result.path.clone(),
                record: record.clone(),
            });
            result.records.push(record);
            result.matches += 1;
        }

        Ok(result)
    }
}
