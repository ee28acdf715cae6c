/// Mean of a numeric field for one device across a directory of files.
///
/// # Extraction Rules
///
/// ```text
/// .csv   header row names the field's column; column 1 is the device, column 0 the timestamp
/// .json  items are objects; "device" and "timestamp" keys, value under the field name
/// .txt   whitespace tokens: device, field name, value, optional timestamp
/// ```
///
/// Values are kept when they parse as numbers and pass the optional
/// `Condition`. Anything else is skipped without an error.
pub mod calculator;
pub mod condition;

pub use calculator::{calculate_mean, MeanQuery};
pub use condition::{evaluate, Comparison, Condition};
