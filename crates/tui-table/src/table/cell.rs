//! Cell content types for DataTable.

use crate::format::{format_currency, format_date};
use crate::row::label_of;

use chrono::{DateTime, Utc};
use ratatui::style::Color;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Content that can be displayed in a table cell.
#[derive(Debug, Clone)]
pub enum CellContent {
    /// Nothing to show
    Empty,
    /// Plain text
    Text(String),
    /// Numeric value (for sorting)
    Number(f64),
    /// Amount in minor units with its currency code
    Money { minor_units: i64, currency: String },
    /// Point in time
    Date(DateTime<Utc>),
    /// Badge with label and color
    Badge { label: String, color: Color },
    /// Row selection checkbox
    Checkbox(bool),
}

impl CellContent {
    /// Create a text cell.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Create a number cell.
    pub fn number(n: f64) -> Self {
        Self::Number(n)
    }

    /// Create a money cell.
    pub fn money(minor_units: i64, currency: impl Into<String>) -> Self {
        Self::Money {
            minor_units,
            currency: currency.into(),
        }
    }

    /// Create a badge cell.
    pub fn badge(label: impl Into<String>, color: Color) -> Self {
        Self::Badge {
            label: label.into(),
            color,
        }
    }

    /// Foreground color, if the content carries one.
    pub fn color(&self) -> Option<Color> {
        match self {
            Self::Badge { color, .. } => Some(*color),
            _ => None,
        }
    }

    /// Get the sortable value for comparison.
    fn sort_key(&self) -> SortKey {
        match self {
            Self::Empty => SortKey::Empty,
            Self::Text(s) => SortKey::Text(s.to_lowercase()),
            Self::Number(n) => SortKey::Number(*n),
            Self::Money { minor_units, .. } => SortKey::Number(*minor_units as f64),
            Self::Date(at) => SortKey::Number(at.timestamp_millis() as f64),
            Self::Badge { label, .. } => SortKey::Text(label.to_lowercase()),
            Self::Checkbox(checked) => SortKey::Number(if *checked { 1.0 } else { 0.0 }),
        }
    }
}

#[derive(Debug, PartialEq)]
enum SortKey {
    Empty,
    Number(f64),
    Text(String),
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for SortKey {}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Empty, SortKey::Empty) => Ordering::Equal,
            (SortKey::Empty, _) => Ordering::Less,
            (_, SortKey::Empty) => Ordering::Greater,
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
        }
    }
}

impl PartialEq for CellContent {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for CellContent {}

impl PartialOrd for CellContent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellContent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl fmt::Display for CellContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => write!(f, "{}", s),
            Self::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{:.2}", n)
                }
            }
            Self::Money {
                minor_units,
                currency,
            } => write!(f, "{}", format_currency(*minor_units, currency)),
            Self::Date(at) => write!(f, "{}", format_date(at)),
            Self::Badge { label, .. } => write!(f, "{}", label),
            Self::Checkbox(checked) => write!(f, "{}", if *checked { "[x]" } else { "[ ]" }),
        }
    }
}

impl From<String> for CellContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for CellContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for CellContent {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for CellContent {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<u64> for CellContent {
    fn from(n: u64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<DateTime<Utc>> for CellContent {
    fn from(at: DateTime<Utc>) -> Self {
        Self::Date(at)
    }
}

/// Field values map onto cells: label objects become badges, using their
/// `color` name when it is one Ratatui knows.
impl From<Value> for CellContent {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Bool(b) => Self::Text(b.to_string()),
            Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Empty),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::Text(
                items
                    .into_iter()
                    .map(|v| CellContent::from(v).to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            object @ Value::Object(_) => match label_of(&object) {
                Some(label) => {
                    let color = object
                        .get("color")
                        .and_then(Value::as_str)
                        .and_then(|c| c.parse::<Color>().ok())
                        .unwrap_or(Color::Reset);
                    Self::badge(label, color)
                }
                None => Self::Text(object.to_string()),
            },
        }
    }
}
