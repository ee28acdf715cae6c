use std::borrow::Cow;
use std::path::Path;
use tracing::{error, info, trace, warn};

use super::condition::Condition;
use crate::config::{EncodingMode, ScanConfig};
use crate::errors::{ScanError, ScanResult};
use crate::events::{format_mean, ScanEvent, ScanObserver};
use crate::filters::list_files;
use crate::reader::read_records;
use crate::record::{parse_f64, value_as_f64, FileFormat, Record};
use crate::results::{mean, FileMean, MeanReport};

/// CSV column holding the device identifier
const CSV_DEVICE_COLUMN: usize = 1;
/// CSV column holding the timestamp
const CSV_TIMESTAMP_COLUMN: usize = 0;
/// JSON key holding the device identifier
const JSON_DEVICE_KEY: &str = "device";
/// JSON key holding the timestamp
const JSON_TIMESTAMP_KEY: &str = "timestamp";

/// What to aggregate: which device, which field, and how to filter
#[derive(Debug, Clone, PartialEq)]
pub struct MeanQuery {
    /// Device identifier records must carry
    pub device: String,
    /// CSV column name, JSON key or text field name
    pub field: String,
    /// Optional filter on the extracted value
    pub condition: Option<Condition>,
    /// Timestamp whose records are reported as found
    pub timestamp: Option<String>,
}

impl MeanQuery {
    pub fn new(device: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            field: field.into(),
            condition: None,
            timestamp: None,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    fn accepts(&self, value: f64) -> bool {
        self.condition
            .as_ref()
            .map_or(true, |c| c.is_satisfied_by(value))
    }
}

/// Where a value sits inside the records of one file
#[derive(Debug, Clone, Copy)]
enum FieldLocator {
    /// CSV column resolved from the header row
    Column(usize),
    /// JSON key named by the query
    Key,
    /// Third whitespace token of a line whose second token is the field name
    Token,
}

/// A value pulled from a record of the queried device
struct Candidate<'r> {
    value: f64,
    timestamp: Option<Cow<'r, str>>,
}

impl FieldLocator {
    /// Extracts the queried value from `record`, or None when the record
    /// belongs to another device or carries no usable number
    fn extract<'r>(&self, record: &'r Record, query: &MeanQuery) -> Option<Candidate<'r>> {
        match *self {
            FieldLocator::Column(index) => {
                if record.column(CSV_DEVICE_COLUMN)? != query.device.as_str() {
                    return None;
                }
                Some(Candidate {
                    value: parse_f64(&record.column(index)?)?,
                    timestamp: record.column(CSV_TIMESTAMP_COLUMN),
                })
            }
            FieldLocator::Key => {
                let device = record.field(JSON_DEVICE_KEY)?.as_str()?;
                if device != query.device {
                    return None;
                }
                Some(Candidate {
                    value: value_as_f64(record.field(&query.field)?)?,
                    timestamp: record.field_text(JSON_TIMESTAMP_KEY),
                })
            }
            FieldLocator::Token => {
                if record.column(0)? != query.device.as_str()
                    || record.column(1)? != query.field.as_str()
                {
                    return None;
                }
                Some(Candidate {
                    value: parse_f64(&record.column(2)?)?,
                    timestamp: record.column(3),
                })
            }
        }
    }
}

/// Accumulates values and console messages across files
struct MeanAccumulator<'o> {
    observer: &'o mut dyn ScanObserver,
    values: Vec<f64>,
    report: MeanReport,
}

impl<'o> MeanAccumulator<'o> {
    fn new(observer: &'o mut dyn ScanObserver) -> Self {
        Self {
            observer,
            values: Vec::new(),
            report: MeanReport::default(),
        }
    }

    /// Reports an event and records its console message
    fn announce(&mut self, event: ScanEvent) {
        self.report.messages.push(event.to_string());
        self.observer.on_event(&event);
    }

    fn scan_file(
        &mut self,
        path: &Path,
        query: &MeanQuery,
        encoding_mode: EncodingMode,
    ) -> ScanResult<()> {
        let format = FileFormat::from_path(path);
        if format == FileFormat::Other {
            return Err(ScanError::unsupported_format(path));
        }

        info!("Calculating mean from {} file: {}", format, path.display());
        self.observer.on_event(&ScanEvent::FileStarted {
            path: path.to_path_buf(),
            format,
        });

        let mut records = read_records(path, format, encoding_mode)?.into_iter();
        let locator = match format {
            FileFormat::Csv => {
                let header = records.next();
                let index = header.as_ref().and_then(|h| column_index(h, &query.field));
                match index {
                    Some(index) => FieldLocator::Column(index),
                    None => {
                        warn!(
                            "Column '{}' not found in CSV file: {}",
                            query.field,
                            path.display()
                        );
                        self.observer.on_event(&ScanEvent::FileSkipped {
                            path: path.to_path_buf(),
                            reason: format!("column '{}' not found", query.field),
                        });
                        return Ok(());
                    }
                }
            }
            FileFormat::Json => FieldLocator::Key,
            _ => FieldLocator::Token,
        };

        let mut file_values = Vec::new();
        for record in records {
            let Some(candidate) = locator.extract(&record, query) else {
                trace!("Skipping record in {}: {}", path.display(), record);
                continue;
            };
            if !query.accepts(candidate.value) {
                continue;
            }
            file_values.push(candidate.value);

            let timestamp_hit = match (&query.timestamp, &candidate.timestamp) {
                (Some(wanted), Some(found)) => wanted.as_str() == &**found,
                _ => false,
            };
            if timestamp_hit {
                let record = record.into_stored();
                self.announce(ScanEvent::RecordFound {
                    path: path.to_path_buf(),
                    record,
                });
            }
        }

        if let Some(file_mean) = mean(&file_values) {
            info!(
                "Mean value calculated for {}: {}",
                path.display(),
                format_mean(file_mean)
            );
            self.report.file_means.push(FileMean {
                path: path.to_path_buf(),
                mean: file_mean,
                count: file_values.len(),
            });
            self.announce(ScanEvent::FileMean {
                path: path.to_path_buf(),
                mean: file_mean,
            });
        }
        self.values.extend(file_values);
        Ok(())
    }

    fn finish(mut self) -> MeanReport {
        self.report.value_count = self.values.len();
        self.report.overall_mean = mean(&self.values);

        match self.report.overall_mean {
            Some(total) => {
                info!("Final total mean value calculated: {}", format_mean(total));
                self.announce(ScanEvent::FinalMean { mean: total });
            }
            None => {
                info!("No valid values found for mean calculation.");
                self.announce(ScanEvent::NoValidValues);
            }
        }
        self.report
    }
}

/// Position of `name` in a CSV header row
fn column_index(header: &Record, name: &str) -> Option<usize> {
    match header {
        Record::Row(cells) => cells.iter().position(|c| c == name),
        _ => None,
    }
}

/// Computes the mean of `query.field` for `query.device` across every file
/// of `config.root_path`.
///
/// Per-file means cover the values kept from each file; the overall mean is
/// taken over the union of all kept values, not over the per-file means.
/// Files that cannot be read, or whose format carries no fields, are logged
/// and skipped.
pub fn calculate_mean(
    config: &ScanConfig,
    query: &MeanQuery,
    observer: &mut dyn ScanObserver,
) -> ScanResult<MeanReport> {
    info!(
        "Calculating mean of '{}' for device '{}'",
        query.field, query.device
    );

    let files = list_files(config)?;
    observer.on_event(&ScanEvent::ScanStarted {
        total_files: files.len(),
    });

    let mut acc = MeanAccumulator::new(observer);
    for path in files {
        if let Err(e) = acc.scan_file(&path, query, config.encoding_mode) {
            match &e {
                ScanError::UnsupportedFormat(_) => warn!("{}", e),
                _ => error!("{}", e),
            }
            acc.observer.on_event(&ScanEvent::FileSkipped {
                path: path.clone(),
                reason: e.to_string(),
            });
        }
        acc.observer.on_event(&ScanEvent::FileFinished { path });
    }

    Ok(acc.finish())
}
