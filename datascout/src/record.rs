use regex::Regex;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::path::Path;

/// File kinds recognised by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Csv,
    /// `.txt` files
    Text,
    /// Any other extension; searched as text, not aggregated
    Other,
}

impl FileFormat {
    /// Picks the format from the file extension (case-sensitive, like the
    /// names the files are produced with)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => FileFormat::Json,
            Some("csv") => FileFormat::Csv,
            Some("txt") => FileFormat::Text,
            _ => FileFormat::Other,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Json => write!(f, "JSON"),
            FileFormat::Csv => write!(f, "CSV"),
            FileFormat::Text | FileFormat::Other => write!(f, "TXT"),
        }
    }
}

/// One unit of data read from a file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    /// An item of a JSON document
    Json(Value),
    /// A CSV row, header included
    Row(Vec<String>),
    /// A line of a text file, without its terminator
    Line(String),
}

impl Record {
    /// Tests `regex` against this record.
    ///
    /// JSON items are matched against their 4-space indented rendering, CSV
    /// rows match when any single cell does, lines are searched as-is.
    pub fn is_match(&self, regex: &Regex) -> bool {
        match self {
            Record::Json(value) => regex.is_match(&indented_json(value)),
            Record::Row(cells) => cells.iter().any(|cell| regex.is_match(cell)),
            Record::Line(line) => regex.is_match(line),
        }
    }

    /// Form stored in search results: lines are trimmed, other records kept whole
    pub fn into_stored(self) -> Record {
        match self {
            Record::Line(line) => Record::Line(line.trim().to_string()),
            other => other,
        }
    }

    /// Looks a field up by name (JSON key)
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Record::Json(Value::Object(map)) => map.get(name),
            _ => None,
        }
    }

    /// Looks a field up by position (CSV column, whitespace token or array slot)
    pub fn column(&self, index: usize) -> Option<Cow<'_, str>> {
        match self {
            Record::Row(cells) => cells.get(index).map(|c| Cow::Borrowed(c.as_str())),
            Record::Line(line) => line.split_whitespace().nth(index).map(Cow::Borrowed),
            Record::Json(Value::Array(items)) => items.get(index).map(value_text),
            Record::Json(_) => None,
        }
    }

    /// String form of a named field, used for identity checks
    pub fn field_text(&self, name: &str) -> Option<Cow<'_, str>> {
        self.field(name).map(value_text)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Json(value) => write!(f, "{}", value),
            Record::Row(cells) => {
                let quoted: Vec<String> = cells.iter().map(|c| format!("{:?}", c)).collect();
                write!(f, "[{}]", quoted.join(", "))
            }
            Record::Line(line) => write!(f, "{}", line),
        }
    }
}

/// Renders a JSON value with 4-space indentation
pub fn indented_json(value: &Value) -> String {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8(buf).unwrap_or_default(),
        Err(_) => value.to_string(),
    }
}

/// Text of a scalar JSON value: strings unquoted, everything else as JSON
fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// Coerces a JSON value to a float. Numbers and numeric strings qualify.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_f64(s),
        _ => None,
    }
}

/// Parses a float, tolerating surrounding whitespace
pub fn parse_f64(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}
