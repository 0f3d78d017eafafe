//! Value enum for dynamic document field values

use std::cmp::Ordering;
use std::fmt;

use chrono::DateTime;
use chrono::Local;
use chrono::SecondsFormat;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use uuid::Uuid;

use super::Document;

/// A dynamic value that can hold any document field type.
///
/// Documents are schema-less, so every field value is carried as a `Value`.
/// Nested documents and arrays are values too, which is what allows the
/// table model to walk dotted paths like `"address.city"`.
///
/// # Type Mapping
///
/// | Store Type | Rust Variant |
/// |------------|--------------|
/// | null | `Null` |
/// | boolean | `Bool` |
/// | int32 | `Int` |
/// | int64 | `Long` |
/// | double | `Float` |
/// | decimal128 | `Decimal` |
/// | string | `String` |
/// | unique identifier | `Guid` |
/// | timestamp | `DateTime` |
/// | embedded document | `Document` |
/// | array | `Array` |
///
/// # Example
///
/// ```
/// use docgrid_lib::model::Value;
///
/// let name = Value::from("Contoso");
/// let revenue = Value::from(1_000_000i64);
/// let active = Value::from(true);
/// let empty = Value::Null;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null/empty value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 64-bit floating point.
    Float(f64),
    /// Arbitrary precision decimal.
    Decimal(Decimal),
    /// String value.
    String(String),
    /// Unique identifier.
    Guid(Uuid),
    /// Point in time, stored as UTC.
    DateTime(DateTime<Utc>),
    /// Embedded document.
    Document(Document),
    /// Array of values.
    Array(Vec<Value>),
}

impl Value {
    /// Returns `true` if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the embedded document, if this value is one.
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Returns the string slice, if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Decimal(_) => "decimal",
            Value::String(_) => "string",
            Value::Guid(_) => "guid",
            Value::DateTime(_) => "datetime",
            Value::Document(_) => "document",
            Value::Array(_) => "array",
        }
    }

    /// Compares two values using the store's cross-type ordering.
    ///
    /// Values of different types order by type class first:
    /// null < numbers < strings < documents < arrays < identifiers < booleans < timestamps.
    /// Numbers compare by magnitude regardless of their width.
    pub fn compare(&self, other: &Value) -> Ordering {
        let by_class = self.type_class().cmp(&other.type_class());
        if by_class != Ordering::Equal {
            return by_class;
        }

        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Guid(a), Value::Guid(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Document(a), Value::Document(b)) => compare_documents(a, b),
            (Value::Array(a), Value::Array(b)) => compare_arrays(a, b),
            (a, b) => compare_numbers(a, b),
        }
    }

    fn type_class(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Int(_) | Value::Long(_) | Value::Float(_) | Value::Decimal(_) => 1,
            Value::String(_) => 2,
            Value::Document(_) => 3,
            Value::Array(_) => 4,
            Value::Guid(_) => 5,
            Value::Bool(_) => 6,
            Value::DateTime(_) => 7,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(f64::from(*v)),
            Value::Long(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Decimal(v) => v.to_f64(),
            _ => None,
        }
    }
}

fn compare_numbers(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Long(x), Value::Long(y)) => x.cmp(y),
        (Value::Decimal(x), Value::Decimal(y)) => x.cmp(y),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        },
    }
}

fn compare_documents(a: &Document, b: &Document) -> Ordering {
    for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
        let ord = ka.cmp(kb).then_with(|| va.compare(vb));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn compare_arrays(a: &[Value], b: &[Value]) -> Ordering {
    for (va, vb) in a.iter().zip(b.iter()) {
        let ord = va.compare(vb);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// Human-readable rendering used for grid cells.
///
/// Identifiers render in their canonical hyphenated form and timestamps are
/// converted to local time in ISO-8601. Embedded documents and arrays render
/// as compact relaxed extended JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Guid(v) => write!(f, "{}", v.hyphenated()),
            Value::DateTime(v) => write!(
                f,
                "{}",
                v.with_timezone(&Local)
                    .to_rfc3339_opts(SecondsFormat::AutoSi, false)
            ),
            Value::Document(_) | Value::Array(_) => {
                write!(f, "{}", self.to_extended_json(&Default::default()))
            }
        }
    }
}

// =============================================================================
// From implementations
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Guid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v)
    }
}

impl From<Document> for Value {
    fn from(v: Document) -> Self {
        Value::Document(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
