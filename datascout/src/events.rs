use std::fmt;
use std::path::PathBuf;

use crate::record::{FileFormat, Record};

/// Progress notifications raised while a directory is scanned
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    /// File listing finished
    ScanStarted { total_files: usize },
    /// A file is about to be read
    FileStarted { path: PathBuf, format: FileFormat },
    /// A file has been handled, whether or not it produced anything
    FileFinished { path: PathBuf },
    /// A file could not be processed and was skipped
    FileSkipped { path: PathBuf, reason: String },
    /// A search match
    Match { path: PathBuf, record: Record },
    /// A kept value whose record carries the requested timestamp
    RecordFound { path: PathBuf, record: Record },
    /// Mean of the values kept from one file
    FileMean { path: PathBuf, mean: f64 },
    /// Mean over every kept value
    FinalMean { mean: f64 },
    /// No value qualified anywhere
    NoValidValues,
}

impl fmt::Display for ScanEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanEvent::ScanStarted { total_files } => {
                write!(f, "Scanning {} files", total_files)
            }
            ScanEvent::FileStarted { path, format } => {
                write!(f, "Reading {} file: {}", format, path.display())
            }
            ScanEvent::FileFinished { path } => write!(f, "Finished {}", path.display()),
            ScanEvent::FileSkipped { path, reason } => {
                write!(f, "Skipped {}: {}", path.display(), reason)
            }
            ScanEvent::Match { record, .. } => write!(f, "{}", record),
            ScanEvent::RecordFound { path, record } => {
                write!(f, "Found matching record in {}: {}", path.display(), record)
            }
            ScanEvent::FileMean { path, mean } => write!(
                f,
                "Mean value calculated for {}: {}",
                path.display(),
                format_mean(*mean)
            ),
            ScanEvent::FinalMean { mean } => {
                write!(f, "Final total mean value calculated: {}", format_mean(*mean))
            }
            ScanEvent::NoValidValues => write!(f, "No valid values found for mean calculation."),
        }
    }
}

/// Renders a mean the way it is reported, keeping `.0` on whole numbers
pub fn format_mean(value: f64) -> String {
    format!("{:?}", value)
}

/// Receives scan events as they happen
pub trait ScanObserver {
    fn on_event(&mut self, event: &ScanEvent);
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {
    fn on_event(&mut self, _event: &ScanEvent) {}
}

impl<F> ScanObserver for F
where
    F: FnMut(&ScanEvent),
{
    fn on_event(&mut self, event: &ScanEvent) {
        self(event)
    }
}

/// Observer that keeps every event, mostly useful in tests
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<ScanEvent>,
}

impl ScanObserver for EventLog {
    fn on_event(&mut self, event: &ScanEvent) {
        self.events.push(event.clone());
    }
}
