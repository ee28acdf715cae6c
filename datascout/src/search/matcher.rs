use regex::{Regex, RegexBuilder};

use crate::errors::{ScanError, ScanResult};
use crate::record::Record;

/// Compiled search pattern
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
}

impl PatternMatcher {
    /// Compiles `pattern`, optionally ignoring case
    pub fn new(pattern: &str, case_insensitive: bool) -> ScanResult<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()
            .map_err(|e| ScanError::invalid_pattern(e.to_string()))?;
        Ok(Self { regex })
    }

    /// The source pattern
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Tests the pattern against a record
    pub fn is_match(&self, record: &Record) -> bool {
        record.is_match(&self.regex)
    }
}
