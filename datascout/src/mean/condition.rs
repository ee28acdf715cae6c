use std::fmt;
use std::str::FromStr;

use crate::errors::{ScanError, ScanResult};

/// Comparison operator of a condition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Comparison {
    Equal,
    Greater,
    Less,
    /// Any other operator character; never satisfied
    Unsupported(char),
}

impl From<char> for Comparison {
    fn from(c: char) -> Self {
        match c {
            '=' => Comparison::Equal,
            '>' => Comparison::Greater,
            '<' => Comparison::Less,
            other => Comparison::Unsupported(other),
        }
    }
}

/// Numeric filter such as `>5.0`: an operator character followed by a threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition {
    pub comparison: Comparison,
    pub threshold: f64,
}

impl Condition {
    /// Parses `<op><threshold>`. Unknown operators parse fine and reject
    /// every value; a missing or non-numeric threshold is an error.
    pub fn parse(text: &str) -> ScanResult<Self> {
        let mut chars = text.chars();
        let op = chars
            .next()
            .ok_or_else(|| ScanError::invalid_condition("empty condition"))?;
        let threshold = chars
            .as_str()
            .trim()
            .parse::<f64>()
            .map_err(|_| ScanError::invalid_condition(text))?;

        Ok(Self {
            comparison: Comparison::from(op),
            threshold,
        })
    }

    /// Whether `value` passes this condition
    pub fn is_satisfied_by(&self, value: f64) -> bool {
        match self.comparison {
            Comparison::Equal => value == self.threshold,
            Comparison::Greater => value > self.threshold,
            Comparison::Less => value < self.threshold,
            Comparison::Unsupported(_) => false,
        }
    }
}

impl FromStr for Condition {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::parse(s)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.comparison {
            Comparison::Equal => '=',
            Comparison::Greater => '>',
            Comparison::Less => '<',
            Comparison::Unsupported(c) => c,
        };
        write!(f, "{}{}", op, self.threshold)
    }
}

/// Evaluates an optional condition string against `value`.
///
/// No condition always passes. A condition that cannot be parsed fails.
pub fn evaluate(value: f64, condition: Option<&str>) -> bool {
    match condition {
        None => true,
        Some(text) => Condition::parse(text)
            .map(|c| c.is_satisfied_by(value))
            .unwrap_or(false),
    }
}
