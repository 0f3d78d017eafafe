//! Cell presentation types

use crate::model::JsonOptions;
use crate::model::Value;

/// How a cell value should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresentationMode {
    /// Short human-readable text for grid cells.
    #[default]
    Display,
    /// Indented extended JSON, suitable for tooltips and detail panes.
    Detail,
    /// The underlying value, unconverted.
    Raw,
}

/// The result of a cell lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CellData {
    /// Rendered text (display and detail modes).
    Text(String),
    /// The raw value (raw mode).
    Value(Value),
}

impl CellData {
    /// Renders `value` according to `mode`.
    pub(crate) fn render(value: &Value, mode: PresentationMode, json: &JsonOptions) -> Self {
        match mode {
            PresentationMode::Display => CellData::Text(value.to_string()),
            PresentationMode::Detail => CellData::Text(value.to_pretty_json(json)),
            PresentationMode::Raw => CellData::Value(value.clone()),
        }
    }

    /// Returns the text, if this is rendered text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellData::Text(text) => Some(text),
            CellData::Value(_) => None,
        }
    }

    /// Returns the value, if this is a raw value.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            CellData::Value(value) => Some(value),
            CellData::Text(_) => None,
        }
    }

    /// Consumes the cell and returns a string form of it.
    pub fn into_string(self) -> String {
        match self {
            CellData::Text(text) => text,
            CellData::Value(value) => value.to_string(),
        }
    }
}

/// Header orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Column headers.
    Horizontal,
    /// Row headers.
    Vertical,
}

/// A header section label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderData {
    /// Column identifier.
    Column(String),
    /// One-based row number.
    Row(usize),
}

impl std::fmt::Display for HeaderData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderData::Column(name) => write!(f, "{}", name),
            HeaderData::Row(number) => write!(f, "{}", number),
        }
    }
}
