/// Pattern search over the records of every file in a directory.
///
/// # Record Rules
///
/// Each file is parsed by extension and its records tested one by one:
/// ```text
/// .json  each item, rendered with 4-space indentation, is searched
/// .csv   the header row is always kept; a later row is kept when any cell matches
/// other  each line is searched and kept trimmed
/// ```
///
/// # Usage
///
/// ```rust,ignore
/// let options = SearchOptions { case_insensitive: true, output_format: OutputFormat::Json };
/// let output = search(&config, "offline", &options, &mut |event: &ScanEvent| {
///     if let ScanEvent::Match { record, .. } = event {
///         println!("{}", record);
///     }
/// })?;
/// ```
pub mod engine;
pub mod matcher;
pub mod processor;

pub use engine::search;
pub use matcher::PatternMatcher;
pub use processor::FileProcessor;
