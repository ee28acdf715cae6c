use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::errors::ScanError;

/// Configuration shared by the search and mean-calculation operations.
///
/// # Configuration Locations
///
/// Loaded from the following locations, later entries overriding earlier ones:
/// 1. Global `$CONFIG_DIR/datascout/config.yaml`
/// 2. Local `.datascout.yaml` in the current directory
/// 3. Custom config file specified via `--config`
///
/// # Configuration Format
///
/// ```yaml
/// # Directory whose files are scanned (not recursive)
/// root_path: "./readings"
///
/// # Where result and log files are written
/// output_dir: "."
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
///
/// # How to handle invalid UTF-8 in text files (failfast, lossy)
/// encoding_mode: "failfast"
///
/// # Only scan these extensions
/// file_extensions: ["csv", "json", "txt"]
///
/// # File names to skip (glob syntax)
/// ignore_patterns: ["*.bak"]
///
/// # Search defaults
/// case_insensitive: false
/// output_format: "json"
/// ```
///
/// Command-line arguments take precedence over file values, see `merge_with_cli`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Directory to scan
    #[serde(default = "default_root_path")]
    pub root_path: PathBuf,

    /// Directory receiving result files and the log file
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// How invalid UTF-8 in text files is handled
    #[serde(default)]
    pub encoding_mode: EncodingMode,

    /// Optional list of file extensions to include (e.g., ["csv", "json"])
    /// If None, every regular file is scanned
    #[serde(default)]
    pub file_extensions: Option<Vec<String>>,

    /// File name patterns to skip (glob syntax)
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Default for case-insensitive search
    #[serde(default)]
    pub case_insensitive: bool,

    /// Default serialization of search results
    #[serde(default)]
    pub output_format: OutputFormat,
}

/// How to handle invalid UTF-8 sequences when decoding a file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    /// Skip the file with an encoding error
    #[default]
    FailFast,
    /// Replace invalid sequences with U+FFFD and keep going
    Lossy,
}

/// Serialization used for the search results file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One indented JSON document holding every match
    #[default]
    Json,
    /// One stringified match per line
    #[serde(alias = "txt")]
    Text,
}

impl OutputFormat {
    /// File extension used for result files of this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(ScanError::config_error(format!(
                "unknown output format: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

impl FromStr for EncodingMode {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "failfast" => Ok(EncodingMode::FailFast),
            "lossy" => Ok(EncodingMode::Lossy),
            other => Err(ScanError::config_error(format!(
                "unknown encoding mode: {}",
                other
            ))),
        }
    }
}

/// Settings given on the command line. `None` keeps the loaded value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOverrides {
    pub root_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub encoding_mode: Option<EncodingMode>,
    pub file_extensions: Option<Vec<String>>,
    pub ignore_patterns: Vec<String>,
    pub case_insensitive: Option<bool>,
    pub output_format: Option<OutputFormat>,
}

/// Options for one search invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_insensitive: bool,
    pub output_format: OutputFormat,
}

fn default_root_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            output_dir: default_output_dir(),
            log_level: default_log_level(),
            encoding_mode: EncodingMode::default(),
            file_extensions: None,
            ignore_patterns: Vec::new(),
            case_insensitive: false,
            output_format: OutputFormat::default(),
        }
    }
}

impl ScanConfig {
    /// Creates a default configuration rooted at `root_path`
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            ..Default::default()
        }
    }

    /// Loads configuration from the default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("datascout/config.yaml")),
            Some(PathBuf::from(".datascout.yaml")),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicit file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values. Every value
    /// given on the command line wins, including one equal to the default.
    pub fn merge_with_cli(mut self, cli: ScanOverrides) -> Self {
        if let Some(root_path) = cli.root_path {
            self.root_path = root_path;
        }
        if let Some(output_dir) = cli.output_dir {
            self.output_dir = output_dir;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
        if let Some(encoding_mode) = cli.encoding_mode {
            self.encoding_mode = encoding_mode;
        }
        if cli.file_extensions.is_some() {
            self.file_extensions = cli.file_extensions;
        }
        if !cli.ignore_patterns.is_empty() {
            self.ignore_patterns = cli.ignore_patterns;
        }
        if let Some(case_insensitive) = cli.case_insensitive {
            self.case_insensitive = case_insensitive;
        }
        if let Some(output_format) = cli.output_format {
            self.output_format = output_format;
        }
        self
    }

    /// Search options derived from this configuration
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            case_insensitive: self.case_insensitive,
            output_format: self.output_format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let config_content = r#"
            root_path: "readings"
            output_dir: "out"
            log_level: "debug"
            encoding_mode: "lossy"
            file_extensions: ["csv", "json"]
            ignore_patterns: ["*.bak"]
            case_insensitive: true
            output_format: "txt"
        "#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = ScanConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.root_path, PathBuf::from("readings"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.encoding_mode, EncodingMode::Lossy);
        assert_eq!(
            config.file_extensions,
            Some(vec!["csv".to_string(), "json".to_string()])
        );
        assert_eq!(config.ignore_patterns, vec!["*.bak".to_string()]);
        assert!(config.case_insensitive);
        assert_eq!(config.output_format, OutputFormat::Text);
    }

    #[test]
    fn test_default_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(b"root_path: \"data\"\n").unwrap();

        let config = ScanConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.root_path, PathBuf::from("data"));
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.encoding_mode, EncodingMode::FailFast);
        assert_eq!(config.file_extensions, None);
        assert!(config.ignore_patterns.is_empty());
        assert!(!config.case_insensitive);
        assert_eq!(config.output_format, OutputFormat::Json);
    }

    fn file_config() -> ScanConfig {
        ScanConfig {
            root_path: PathBuf::from("readings"),
            output_dir: PathBuf::from("out"),
            log_level: "warn".to_string(),
            encoding_mode: EncodingMode::Lossy,
            file_extensions: Some(vec!["csv".to_string()]),
            ignore_patterns: vec!["*.bak".to_string()],
            case_insensitive: false,
            output_format: OutputFormat::Text,
        }
    }

    #[test]
    fn test_merge_with_cli() {
        let cli = ScanOverrides {
            root_path: Some(PathBuf::from("other")),
            case_insensitive: Some(true),
            ..Default::default()
        };

        let merged = file_config().merge_with_cli(cli);
        assert_eq!(merged.root_path, PathBuf::from("other")); // CLI value
        assert_eq!(merged.output_dir, PathBuf::from("out")); // File value
        assert_eq!(merged.log_level, "warn");
        assert_eq!(merged.encoding_mode, EncodingMode::Lossy);
        assert_eq!(merged.file_extensions, Some(vec!["csv".to_string()]));
        assert!(merged.case_insensitive); // CLI value
        assert_eq!(merged.output_format, OutputFormat::Text);
    }

    #[test]
    fn test_cli_can_restore_defaults() {
        let from_file = ScanConfig {
            case_insensitive: true,
            ..file_config()
        };
        let cli = ScanOverrides {
            output_dir: Some(PathBuf::from(".")),
            log_level: Some("info".to_string()),
            encoding_mode: Some(EncodingMode::FailFast),
            case_insensitive: Some(false),
            output_format: Some(OutputFormat::Json),
            ..Default::default()
        };

        let merged = from_file.merge_with_cli(cli);
        assert_eq!(merged.root_path, PathBuf::from("readings"));
        assert_eq!(merged.output_dir, PathBuf::from("."));
        assert_eq!(merged.log_level, "info");
        assert_eq!(merged.encoding_mode, EncodingMode::FailFast);
        assert!(!merged.case_insensitive);
        assert_eq!(merged.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let mut file = File::create(&config_path).unwrap();
        file.write_all(b"output_format: \"xml\"\nignore_patterns: 12\n")
            .unwrap();

        assert!(ScanConfig::load_from(Some(&config_path)).is_err());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ScanConfig::load_from(Some(Path::new("nonexistent.yaml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(
            "lossy".parse::<EncodingMode>().unwrap(),
            EncodingMode::Lossy
        );
    }
}
