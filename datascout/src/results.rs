use std::path::PathBuf;

use crate::record::Record;

/// Matches found in a single file
#[derive(Debug, Clone, Default)]
pub struct FileResult {
    /// The path to the file
    pub path: PathBuf,
    /// Records kept from the file, in file order. For CSV files the header
    /// row comes first and is not counted as a match.
    pub records: Vec<Record>,
    /// Number of records that matched the pattern
    pub matches: usize,
}

/// The complete search results
#[derive(Debug, Clone, Default)]
pub struct SearchOutput {
    /// Results per file
    pub file_results: Vec<FileResult>,
    /// Total number of matches found
    pub total_matches: usize,
    /// Total number of files searched
    pub files_searched: usize,
    /// Total number of files with matches
    pub files_with_matches: usize,
}

impl SearchOutput {
    /// Creates a new empty search result
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a file result to the search results
    pub fn add_file_result(&mut self, file_result: FileResult) {
        self.files_searched += 1;
        if file_result.matches > 0 {
            self.total_matches += file_result.matches;
            self.files_with_matches += 1;
        }
        self.file_results.push(file_result);
    }

    /// Every kept record across all files, in scan order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.file_results.iter().flat_map(|r| r.records.iter())
    }
}

/// Mean of the values kept from one file
#[derive(Debug, Clone, PartialEq)]
pub struct FileMean {
    pub path: PathBuf,
    pub mean: f64,
    pub count: usize,
}

/// Outcome of a mean calculation
#[derive(Debug, Clone, Default)]
pub struct MeanReport {
    /// Files that contributed at least one value
    pub file_means: Vec<FileMean>,
    /// Mean over the union of kept values, None when nothing qualified
    pub overall_mean: Option<f64>,
    /// Number of values behind `overall_mean`
    pub value_count: usize,
    /// Console messages in the order they were produced
    pub messages: Vec<String>,
}

/// Arithmetic mean, None for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
