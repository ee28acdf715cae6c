use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use datascout::{
    calculate_mean,
    output::{write_mean_messages, write_search_results, MEAN_LOG_FILE, SEARCH_LOG_FILE},
    search, Condition, EncodingMode, MeanQuery, OutputFormat, ScanConfig, ScanError, ScanEvent,
    ScanObserver, ScanOverrides,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, ScanError>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CommonArgs {
    /// Directory whose files are scanned, not recursive [default: .]
    #[arg(short = 'd', long = "dir")]
    root: Option<PathBuf>,

    /// Directory receiving result and log files [default: .]
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Configuration file (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// File extensions to include (e.g. csv,json,txt)
    #[arg(short = 'e', long)]
    extensions: Option<String>,

    /// File names to skip (glob format)
    #[arg(long)]
    ignore: Vec<String>,

    /// How to handle invalid UTF-8 sequences (failfast|lossy) [default: failfast]
    #[arg(long)]
    encoding: Option<String>,

    /// Log level written to the log file (trace|debug|info|warn|error) [default: info]
    #[arg(long)]
    log_level: Option<String>,

    /// Hide the progress bar
    #[arg(short = 'q', long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search files for a regular expression
    Search {
        /// Pattern to search for (regular expression)
        #[arg(short = 'p', long)]
        pattern: String,

        /// Match regardless of case
        #[arg(short = 'i', long, conflicts_with = "case_sensitive")]
        ignore_case: bool,

        /// Match case exactly, overriding the config file
        #[arg(long)]
        case_sensitive: bool,

        /// Results file format (json|text) [default: json]
        #[arg(short = 'f', long)]
        format: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Calculate the mean of a field for one device
    Mean {
        /// Device identifier to filter on
        #[arg(long)]
        device: String,

        /// Column, key or field name holding the value
        #[arg(long)]
        field: String,

        /// Keep only values satisfying this condition (e.g. ">5.0", "=10", "<3")
        #[arg(short = 'c', long, allow_hyphen_values = true)]
        condition: Option<String>,

        /// Report records carrying this timestamp
        #[arg(short = 't', long)]
        timestamp: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

/// Prints scan events to the console while driving a progress bar
struct ConsoleObserver {
    show_progress: bool,
    progress: Option<ProgressBar>,
}

impl ConsoleObserver {
    fn new(show_progress: bool) -> Self {
        Self {
            show_progress,
            progress: None,
        }
    }

    fn println(&self, line: String) {
        match &self.progress {
            Some(bar) => bar.suspend(|| println!("{}", line)),
            None => println!("{}", line),
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.progress.take() {
            bar.finish_and_clear();
        }
    }
}

impl ScanObserver for ConsoleObserver {
    fn on_event(&mut self, event: &ScanEvent) {
        match event {
            ScanEvent::ScanStarted { total_files } => {
                if self.show_progress {
                    let bar = ProgressBar::new(*total_files as u64);
                    bar.set_style(
                        ProgressStyle::default_bar()
                            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files {msg}")
                            .unwrap_or_else(|_| ProgressStyle::default_bar())
                            .progress_chars("=>-"),
                    );
                    self.progress = Some(bar);
                }
            }
            ScanEvent::FileStarted { path, .. } => {
                if let Some(bar) = &self.progress {
                    let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
                    bar.set_message(name.unwrap_or_default());
                }
            }
            ScanEvent::FileFinished { .. } => {
                if let Some(bar) = &self.progress {
                    bar.inc(1);
                }
            }
            ScanEvent::FileSkipped { .. } => self.println(event.to_string().red().to_string()),
            ScanEvent::Match { .. } | ScanEvent::RecordFound { .. } => {
                self.println(event.to_string())
            }
            ScanEvent::FileMean { .. } => self.println(event.to_string().green().to_string()),
            ScanEvent::FinalMean { .. } => self.println(event.to_string().bold().to_string()),
            ScanEvent::NoValidValues => self.println(event.to_string().yellow().to_string()),
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{}", e.to_string().red());
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            pattern,
            ignore_case,
            case_sensitive,
            format,
            common,
        } => {
            let mut overrides = cli_overrides(&common)?;
            overrides.output_format = format.map(|f| f.parse::<OutputFormat>()).transpose()?;
            overrides.case_insensitive = match (ignore_case, case_sensitive) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let config = load_config(&common, overrides)?;
            init_logging(&config, SEARCH_LOG_FILE)?;

            let options = config.search_options();

            let mut observer = ConsoleObserver::new(!common.quiet);
            let result = search(&config, &pattern, &options, &mut observer)?;
            observer.finish();

            let path =
                write_search_results(result.records(), options.output_format, &config.output_dir)?;
            println!(
                "\nFound {} matches in {} files",
                result.total_matches, result.files_with_matches
            );
            println!("Results written to {}", path.display().to_string().blue());
            Ok(())
        }
        Commands::Mean {
            device,
            field,
            condition,
            timestamp,
            common,
        } => {
            let config = load_config(&common, cli_overrides(&common)?)?;
            init_logging(&config, MEAN_LOG_FILE)?;

            let mut query = MeanQuery::new(device, field);
            if let Some(text) = condition {
                query = query.with_condition(Condition::parse(&text)?);
            }
            if let Some(ts) = timestamp {
                query = query.with_timestamp(ts);
            }

            let mut observer = ConsoleObserver::new(!common.quiet);
            let report = calculate_mean(&config, &query, &mut observer)?;
            observer.finish();

            let path = write_mean_messages(&report.messages, &config.output_dir)?;
            println!("Messages written to {}", path.display().to_string().blue());
            Ok(())
        }
    }
}

/// Settings given explicitly on the command line
fn cli_overrides(common: &CommonArgs) -> Result<ScanOverrides> {
    let file_extensions = common.extensions.as_ref().map(|e| {
        e.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
    });

    Ok(ScanOverrides {
        root_path: common.root.clone(),
        output_dir: common.output_dir.clone(),
        log_level: common.log_level.clone(),
        encoding_mode: common
            .encoding
            .as_deref()
            .map(str::parse::<EncodingMode>)
            .transpose()?,
        file_extensions,
        ignore_patterns: common.ignore.clone(),
        ..Default::default()
    })
}

/// Loads the config files and lets the command line override them
fn load_config(common: &CommonArgs, overrides: ScanOverrides) -> Result<ScanConfig> {
    let file_config = ScanConfig::load_from(common.config.as_deref())
        .map_err(|e| ScanError::config_error(e.to_string()))?;
    Ok(file_config.merge_with_cli(overrides))
}

/// Sends log output to `log_file` inside the output directory
fn init_logging(config: &ScanConfig, log_file: &str) -> Result<()> {
    fs::create_dir_all(&config.output_dir)?;
    let log_path = config.output_dir.join(log_file);
    let file = OpenOptions::new().create(true).append(true).open(&log_path)?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| ScanError::config_error(format!("failed to initialize logging: {}", e)))?;

    info!(
        "datascout {} logging to {}",
        env!("CARGO_PKG_VERSION"),
        log_path.display()
    );
    Ok(())
}
