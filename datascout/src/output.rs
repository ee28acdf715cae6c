use chrono::Local;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::OutputFormat;
use crate::errors::ScanResult;
use crate::record::Record;

/// Log file written by the search command
pub const SEARCH_LOG_FILE: &str = "search_log.txt";
/// Log file written by the mean command
pub const MEAN_LOG_FILE: &str = "mean_calculation_log.txt";

/// Second-resolution local timestamp used in result file names
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d%H%M%S").to_string()
}

/// Name of the search results file for `format` at `stamp`
pub fn search_results_name(format: OutputFormat, stamp: &str) -> String {
    format!("search_results_{}.{}", stamp, format.extension())
}

/// Name of the mean console-log file at `stamp`
pub fn mean_results_name(stamp: &str) -> String {
    format!("mean_calculation_results{}.txt", stamp)
}

fn create(output_dir: &Path, name: &str) -> ScanResult<(PathBuf, BufWriter<File>)> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(name);
    let file = File::create(&path)?;
    Ok((path, BufWriter::new(file)))
}

/// Writes search results into `output_dir` and returns the file's path.
///
/// JSON output is a single array indented by four spaces; text output has
/// one record per line.
pub fn write_search_results<'a, I>(
    records: I,
    format: OutputFormat,
    output_dir: &Path,
) -> ScanResult<PathBuf>
where
    I: IntoIterator<Item = &'a Record>,
{
    let (path, mut writer) = create(output_dir, &search_results_name(format, &timestamp()))?;

    match format {
        OutputFormat::Json => {
            let records: Vec<&Record> = records.into_iter().collect();
            let formatter = PrettyFormatter::with_indent(b"    ");
            let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
            records.serialize(&mut ser)?;
            writeln!(writer)?;
        }
        OutputFormat::Text => {
            for record in records {
                writeln!(writer, "{}", record)?;
            }
        }
    }

    writer.flush()?;
    info!("Search results written to {}", path.display());
    Ok(path)
}

/// Writes the console messages of a mean calculation, one per line
pub fn write_mean_messages(messages: &[String], output_dir: &Path) -> ScanResult<PathBuf> {
    let (path, mut writer) = create(output_dir, &mean_results_name(&timestamp()))?;
    for line in messages {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    info!("Mean calculation messages written to {}", path.display());
    Ok(path)
}
