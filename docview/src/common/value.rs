use crate::collection::Document;
use crate::common::{
    EXT_DATE, EXT_NUMBER_DECIMAL, EXT_NUMBER_DOUBLE, EXT_NUMBER_INT, EXT_NUMBER_LONG, EXT_OID,
};
use crate::errors::{ErrorKind, ViewError, ViewResult};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// Compare two floats with a total order. NaN is greater than every other number.
#[inline]
fn num_cmp_float(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Compare an integer with a float exactly, without rounding the integer to
/// the nearest float. NaN is greater than every integer.
fn num_cmp_int_float(i: i64, f: f64) -> Ordering {
    // 2^63, the first float above every i64
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

    if f.is_nan() || f >= I64_BOUND {
        return Ordering::Less;
    }
    if f < -I64_BOUND {
        return Ordering::Greater;
    }

    let floor = f.floor();
    match (i as i128).cmp(&(floor as i128)) {
        Ordering::Equal if f > floor => Ordering::Less,
        ordering => ordering,
    }
}

/// Compare two floats for equality. NaN equals NaN.
#[inline]
fn num_eq_float(a: f64, b: f64) -> bool {
    if a.is_nan() && b.is_nan() {
        true
    } else {
        a == b
    }
}

/// A [Document] field value.
///
/// # Variants
/// - Null: absence of a value. Missing fields resolve to `Null`.
/// - Bool(bool)
/// - I64 / F64: numbers. Integers and floats compare and test equal numerically
///   with each other, never with strings or booleans.
/// - String(String)
/// - Document(Document): nested document
/// - Array(Vec<Value>): ordered sequence of values
///
/// # Ordering
/// Values of different kinds are ordered by [Value::type_rank]:
/// `Null < Bool < number < String < Document < Array`. Within a kind, numbers
/// compare numerically, strings by byte order, documents field by field and
/// arrays element by element. The order is total.
#[derive(Clone, Debug, Default, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Represents a null value.
    #[default]
    Null,
    /// Represents a boolean value.
    Bool(bool),
    /// Represents an integer number.
    I64(i64),
    /// Represents a floating point number.
    F64(f64),
    /// Represents a string value.
    String(String),
    /// Represents a nested document.
    Document(Document),
    /// Represents an array value.
    Array(Vec<Value>),
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => num_eq_float(*a, *b),
            (Value::I64(a), Value::F64(b)) | (Value::F64(b), Value::I64(a)) => {
                num_cmp_int_float(*a, *b) == Ordering::Equal
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Document(a), Value::Document(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl Value {
    /// Creates a new [Value] from anything convertible into one.
    pub fn from<T: Into<Value>>(value: T) -> Value {
        value.into()
    }

    /// Converts `None` to [Value::Null] and `Some(v)` to the converted value.
    pub fn from_option<T: Into<Value>>(value: Option<T>) -> Value {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }

    /// Creates a [Value::Array] from a vector of convertible values.
    pub fn from_vec<T: Into<Value>>(values: Vec<T>) -> Value {
        Value::Array(values.into_iter().map(|v| v.into()).collect())
    }

    /// Rank of the value's kind in the cross-type sort order.
    pub fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::I64(_) | Value::F64(_) => 2,
            Value::String(_) => 3,
            Value::Document(_) => 4,
            Value::Array(_) => 5,
        }
    }

    /// Name of the value's kind, used in log and error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I64(_) | Value::F64(_) => "number",
            Value::String(_) => "string",
            Value::Document(_) => "document",
            Value::Array(_) => "array",
        }
    }

    /// Compares two values of the same kind.
    ///
    /// Returns `None` when the kinds differ (for example a string and a
    /// number), so ordering operators never match across types.
    pub fn compare_same_type(&self, other: &Value) -> Option<Ordering> {
        if self.type_rank() != other.type_rank() {
            return None;
        }
        Some(self.total_cmp(other))
    }

    /// Total order over all values; never fails.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::I64(a), Value::I64(b)) => a.cmp(b),
            (Value::F64(a), Value::F64(b)) => num_cmp_float(*a, *b),
            (Value::I64(a), Value::F64(b)) => num_cmp_int_float(*a, *b),
            (Value::F64(a), Value::I64(b)) => num_cmp_int_float(*b, *a).reverse(),
            (Value::String(a), Value::String(b)) => a.as_bytes().cmp(b.as_bytes()),
            (Value::Document(a), Value::Document(b)) => a.total_cmp(b),
            (Value::Array(a), Value::Array(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let cmp = x.total_cmp(y);
                    if cmp != Ordering::Equal {
                        return cmp;
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::I64(_) | Value::F64(_))
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    pub fn is_document(&self) -> bool {
        matches!(self, Value::Document(_))
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn as_bool(&self) -> Option<&bool> {
        match self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            Value::F64(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::I64(v) => Some(*v as f64),
            Value::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&String> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Converts a JSON value into a [Value].
    ///
    /// Extended JSON wrappers written by collection exports are unwrapped:
    /// `{"$oid": "..."}` becomes a string, `{"$numberInt": "4"}` and
    /// `{"$numberLong": "4"}` integers, `{"$numberDouble": ".."}` and
    /// `{"$numberDecimal": ".."}` floats, and `{"$date": ..}` the wrapped
    /// millisecond count or date string.
    pub fn from_json(json: serde_json::Value) -> ViewResult<Value> {
        match json {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::Number(n) => Ok(match n.as_i64() {
                Some(i) => Value::I64(i),
                None => Value::F64(n.as_f64().unwrap_or(f64::NAN)),
            }),
            serde_json::Value::String(s) => Ok(Value::String(s)),
            serde_json::Value::Array(items) => {
                let values = items
                    .into_iter()
                    .map(Value::from_json)
                    .collect::<ViewResult<Vec<_>>>()?;
                Ok(Value::Array(values))
            }
            serde_json::Value::Object(map) => {
                if map.len() == 1 {
                    if let Some((key, inner)) = map.iter().next() {
                        if let Some(value) = Value::from_extended_json(key, inner)? {
                            return Ok(value);
                        }
                    }
                }
                Ok(Value::Document(Document::from_json_map(map)?))
            }
        }
    }

    /// Returns `true` for the single-key wrapper names of extended JSON
    /// (`$oid`, `$date`, `$numberInt`, `$numberLong`, `$numberDouble`, `$numberDecimal`).
    pub fn is_extended_json_key(key: &str) -> bool {
        matches!(
            key,
            EXT_OID | EXT_DATE | EXT_NUMBER_INT | EXT_NUMBER_LONG | EXT_NUMBER_DOUBLE | EXT_NUMBER_DECIMAL
        )
    }

    fn from_extended_json(key: &str, inner: &serde_json::Value) -> ViewResult<Option<Value>> {
        let value = match key {
            EXT_OID => Value::String(Value::extended_text(key, inner)?),
            EXT_NUMBER_INT | EXT_NUMBER_LONG => match inner {
                serde_json::Value::Number(n) if n.is_i64() => Value::I64(n.as_i64().unwrap_or_default()),
                _ => {
                    let text = Value::extended_text(key, inner)?;
                    Value::I64(text.trim().parse::<i64>().map_err(|err| {
                        log::error!("Invalid {} value {}: {}", key, text, err);
                        ViewError::new(
                            &format!("Invalid {} value {}", key, text),
                            ErrorKind::EncodingError,
                        )
                    })?)
                }
            },
            EXT_NUMBER_DOUBLE | EXT_NUMBER_DECIMAL => match inner {
                serde_json::Value::Number(n) => Value::F64(n.as_f64().unwrap_or(f64::NAN)),
                _ => {
                    let text = Value::extended_text(key, inner)?;
                    Value::F64(text.trim().parse::<f64>().map_err(|err| {
                        log::error!("Invalid {} value {}: {}", key, text, err);
                        ViewError::new(
                            &format!("Invalid {} value {}", key, text),
                            ErrorKind::EncodingError,
                        )
                    })?)
                }
            },
            EXT_DATE => Value::from_json(inner.clone())?,
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    fn extended_text(key: &str, inner: &serde_json::Value) -> ViewResult<String> {
        inner.as_str().map(str::to_string).ok_or_else(|| {
            log::error!("Extended json {} expects a string, found {}", key, inner);
            ViewError::new(
                &format!("Extended json {} expects a string", key),
                ErrorKind::EncodingError,
            )
        })
    }

    /// Converts the value into JSON. Non finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::I64(i) => serde_json::Value::from(*i),
            Value::F64(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Document(doc) => doc.to_json(),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
        }
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::I64(value as i64)
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::F64(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::F64(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Document(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}
