//! Extended JSON conversion for documents and values
//!
//! Store-specific scalars (identifiers, timestamps, wide numbers) have no
//! native JSON form, so they are wrapped in `$`-prefixed objects following
//! the Extended JSON v2 conventions. Relaxed mode keeps plain numbers and
//! ISO dates readable; canonical mode preserves exact types.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::DateTime;
use chrono::Datelike;
use chrono::SecondsFormat;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::json;
use serde_json::ser::PrettyFormatter;
use uuid::Uuid;

use super::Document;
use super::Value;

/// Extended JSON output flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonMode {
    /// Numbers stay native JSON numbers and dates are ISO-8601 strings.
    #[default]
    Relaxed,
    /// Every typed scalar is wrapped so it round-trips without loss.
    Canonical,
}

/// Formatting options for the detail rendering of values.
///
/// # Example
///
/// ```
/// use docgrid_lib::model::{JsonMode, JsonOptions};
///
/// let options = JsonOptions::default()
///     .with_mode(JsonMode::Canonical)
///     .with_indent(4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonOptions {
    /// Output flavour.
    ///
    /// Default: relaxed
    pub mode: JsonMode,

    /// Spaces per indentation level in pretty output.
    ///
    /// Default: 2
    pub indent: usize,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            mode: JsonMode::Relaxed,
            indent: 2,
        }
    }
}

impl JsonOptions {
    /// Sets the output flavour.
    pub fn with_mode(mut self, mode: JsonMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the indentation width.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

impl Value {
    /// Converts this value to extended JSON.
    pub fn to_extended_json(&self, options: &JsonOptions) -> serde_json::Value {
        let canonical = options.mode == JsonMode::Canonical;
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::Int(v) if canonical => json!({ "$numberInt": v.to_string() }),
            Value::Int(v) => json!(v),
            Value::Long(v) if canonical => json!({ "$numberLong": v.to_string() }),
            Value::Long(v) => json!(v),
            Value::Float(v) if canonical || !v.is_finite() => {
                json!({ "$numberDouble": format_double(*v) })
            }
            Value::Float(v) => json!(v),
            Value::Decimal(v) => json!({ "$numberDecimal": v.to_string() }),
            Value::String(v) => serde_json::Value::String(v.clone()),
            Value::Guid(v) if canonical => json!({
                "$binary": { "base64": STANDARD.encode(v.as_bytes()), "subType": "04" }
            }),
            Value::Guid(v) => json!({ "$uuid": v.hyphenated().to_string() }),
            Value::DateTime(v) => date_to_json(v, canonical),
            Value::Document(doc) => doc.to_extended_json(options),
            Value::Array(items) => serde_json::Value::Array(
                items.iter().map(|v| v.to_extended_json(options)).collect(),
            ),
        }
    }

    /// Renders this value as indented extended JSON.
    pub fn to_pretty_json(&self, options: &JsonOptions) -> String {
        pretty(&self.to_extended_json(options), options.indent)
    }

    /// Builds a value from (extended) JSON.
    ///
    /// Recognises `$uuid`, `$binary` (subtype 04), `$date`, `$numberInt`,
    /// `$numberLong`, `$numberDouble` and `$numberDecimal` wrappers. Any other
    /// object becomes an embedded document.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    match i32::try_from(i) {
                        Ok(small) => Value::Int(small),
                        Err(_) => Value::Long(i),
                    }
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(obj) => match wrapped_scalar(&obj) {
                Some(value) => value,
                None => Value::Document(Document::from_json_map(obj)),
            },
        }
    }
}

impl Document {
    /// Converts this document to an extended JSON object.
    pub fn to_extended_json(&self, options: &JsonOptions) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(k, v)| (k.clone(), v.to_extended_json(options)))
                .collect(),
        )
    }

    /// Renders this document as indented extended JSON.
    pub fn to_pretty_json(&self, options: &JsonOptions) -> String {
        pretty(&self.to_extended_json(options), options.indent)
    }

    /// Builds a document from an (extended) JSON value.
    ///
    /// Returns `None` if the value is not a JSON object.
    pub fn from_json(json: serde_json::Value) -> Option<Document> {
        match json {
            serde_json::Value::Object(obj) => Some(Document::from_json_map(obj)),
            _ => None,
        }
    }

    fn from_json_map(obj: Map<String, serde_json::Value>) -> Document {
        obj.into_iter()
            .map(|(k, v)| (k, Value::from_json(v)))
            .collect()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_extended_json(&JsonOptions::default())
            .serialize(serializer)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_extended_json(&JsonOptions::default())
            .serialize(serializer)
    }
}

fn pretty(json: &serde_json::Value, indent: usize) -> String {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    match json.serialize(&mut serializer) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => json.to_string(),
    }
}

fn format_double(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "Infinity".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{:?}", v)
    }
}

fn date_to_json(v: &DateTime<Utc>, canonical: bool) -> serde_json::Value {
    // Relaxed dates are only ISO strings inside the four-digit year range.
    if !canonical && (1970..=9999).contains(&v.year()) {
        json!({ "$date": v.to_rfc3339_opts(SecondsFormat::Millis, true) })
    } else {
        json!({ "$date": { "$numberLong": v.timestamp_millis().to_string() } })
    }
}

fn wrapped_scalar(obj: &Map<String, serde_json::Value>) -> Option<Value> {
    if obj.len() != 1 {
        return None;
    }
    let (key, inner) = obj.iter().next()?;
    match key.as_str() {
        "$uuid" => Uuid::parse_str(inner.as_str()?).ok().map(Value::Guid),
        "$binary" => {
            let subtype = inner.get("subType")?.as_str()?;
            if subtype != "04" {
                return None;
            }
            let bytes = STANDARD.decode(inner.get("base64")?.as_str()?).ok()?;
            Uuid::from_slice(&bytes).ok().map(Value::Guid)
        }
        "$date" => parse_date(inner).map(Value::DateTime),
        "$numberInt" => inner.as_str()?.parse().ok().map(Value::Int),
        "$numberLong" => inner.as_str()?.parse().ok().map(Value::Long),
        "$numberDouble" => match inner.as_str()? {
            "Infinity" => Some(Value::Float(f64::INFINITY)),
            "-Infinity" => Some(Value::Float(f64::NEG_INFINITY)),
            "NaN" => Some(Value::Float(f64::NAN)),
            s => s.parse().ok().map(Value::Float),
        },
        "$numberDecimal" => inner.as_str()?.parse::<Decimal>().ok().map(Value::Decimal),
        _ => None,
    }
}

fn parse_date(inner: &serde_json::Value) -> Option<DateTime<Utc>> {
    match inner {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        serde_json::Value::Number(n) => DateTime::from_timestamp_millis(n.as_i64()?),
        serde_json::Value::Object(_) => {
            let millis = inner.get("$numberLong")?.as_str()?.parse().ok()?;
            DateTime::from_timestamp_millis(millis)
        }
        _ => None,
    }
}
