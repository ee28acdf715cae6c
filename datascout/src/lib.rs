pub mod config;
pub mod errors;
pub mod events;
pub mod filters;
pub mod mean;
pub mod output;
pub mod reader;
pub mod record;
pub mod results;
pub mod search;

pub use self::config::{EncodingMode, OutputFormat, ScanConfig, ScanOverrides, SearchOptions};
pub use errors::{ScanError, ScanResult};
pub use events::{NoopObserver, ScanEvent, ScanObserver};
pub use filters::list_files;
pub use mean::{calculate_mean, evaluate, Condition, MeanQuery};
pub use record::{FileFormat, Record};
pub use results::{FileMean, FileResult, MeanReport, SearchOutput};
pub use search::search;
