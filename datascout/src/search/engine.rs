use tracing::{debug, error, info};

use super::matcher::PatternMatcher;
use super::processor::FileProcessor;
use crate::config::{ScanConfig, SearchOptions};
use crate::errors::ScanResult;
use crate::events::{ScanEvent, ScanObserver};
use crate::filters::list_files;
use crate::record::FileFormat;
use crate::results::SearchOutput;

/// Searches every file of `config.root_path` for `pattern`.
///
/// Files are visited one at a time in listing order. A file that cannot be
/// read or parsed is logged, reported as skipped and left out of the results;
/// only a missing root directory or an invalid pattern fails the search.
pub fn search(
    config: &ScanConfig,
    pattern: &str,
    options: &SearchOptions,
    observer: &mut dyn ScanObserver,
) -> ScanResult<SearchOutput> {
    info!("Starting search for pattern: {:?}", pattern);

    let matcher = PatternMatcher::new(pattern, options.case_insensitive)?;
    let processor = FileProcessor::new(matcher, config.encoding_mode);

    let files = list_files(config)?;
    debug!("Found {} files to search", files.len());
    observer.on_event(&ScanEvent::ScanStarted {
        total_files: files.len(),
    });

    let mut output = SearchOutput::new();

    for path in files {
        let format = FileFormat::from_path(&path);
        info!("Searching in {} file: {}", format, path.display());
        observer.on_event(&ScanEvent::FileStarted {
            path: path.clone(),
            format,
        });

        match processor.process_file(&path, observer) {
            Ok(file_result) => output.add_file_result(file_result),
            Err(e) => {
                error!("{}", e);
                observer.on_event(&ScanEvent::FileSkipped {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }

        observer.on_event(&ScanEvent::FileFinished { path });
    }

    info!(
        "Search complete. Found {} matches in {} files",
        output.total_matches, output.files_with_matches
    );

    Ok(output)
}
