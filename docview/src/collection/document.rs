use indexmap::IndexMap;

use crate::common::{Value, FIELD_SEPARATOR};
use crate::errors::{ErrorKind, ViewError, ViewResult};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::{Debug, Display};

/// A semi-structured record of a collection.
///
/// A document is an ordered mapping from field name to [Value]. Fields keep
/// the order in which they were first inserted, and names are unique at each
/// nesting level.
///
/// Nested fields are addressed with dotted field paths. For a document
/// `{"review_scores": {"review_scores_cleanliness": 10}}`, the path
/// `review_scores.review_scores_cleanliness` resolves to `10`. A numeric path
/// segment indexes into an array (`amenities.0`); any other segment applied to
/// an array of documents collects the field from every element.
///
/// Equality is field-order sensitive: `{a: 1, b: 2}` and `{b: 2, a: 1}` are
/// different documents.
#[derive(Clone, Default, serde::Serialize)]
#[serde(transparent)]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let doc = Document::new();
    /// assert!(doc.is_empty());
    /// assert_eq!(doc.size(), 0);
    /// ```
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    /// Checks if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of top level fields.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates the specified [Value] with the specified key in this document.
    ///
    /// The key may be a dotted path (`"address.market"`), in which case the
    /// intermediate documents are created as needed. An existing top level
    /// field keeps its position when its value is replaced.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidFieldName] if the key, or any segment of a
    /// dotted key, is empty.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let mut doc = Document::new();
    /// doc.put("name", "Ribeira Charming Duplex")?;
    /// doc.put("address.market", "Porto")?;
    /// assert_eq!(doc.get("address.market")?, Value::from("Porto"));
    /// ```
    pub fn put<'a, T: Into<Value>>(&mut self, key: impl Into<Cow<'a, str>>, value: T) -> ViewResult<()> {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(ViewError::new(
                "Document does not support empty key",
                ErrorKind::InvalidFieldName,
            ));
        }

        let value = value.into();
        if self.is_embedded(&key) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_put(&splits, value)
        } else {
            self.data.insert(key.into_owned(), value);
            Ok(())
        }
    }

    /// Returns the [Value] at the specified field path, or [Value::Null] if the
    /// path does not resolve.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidFieldName] if a dotted path contains an empty
    /// segment (`"a..b"`, `"a."`).
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let doc = doc!{ review_scores: { review_scores_cleanliness: 10 } };
    /// assert_eq!(doc.get("review_scores.review_scores_cleanliness")?, Value::I64(10));
    /// assert_eq!(doc.get("missing")?, Value::Null);
    /// ```
    pub fn get(&self, key: &str) -> ViewResult<Value> {
        Ok(self.resolve(key)?.unwrap_or(Value::Null))
    }

    /// Resolves a field path, distinguishing an absent field (`None`) from a
    /// field explicitly holding null (`Some(Value::Null)`).
    pub fn resolve(&self, key: &str) -> ViewResult<Option<Value>> {
        match self.data.get(key) {
            Some(value) => Ok(Some(value.clone())),
            None => {
                // only walk the path if not found at top level
                if self.is_embedded(key) {
                    self.get_by_embedded_key(key)
                } else {
                    Ok(None)
                }
            }
        }
    }

    /// Returns `true` if the field path resolves to a value, null included.
    pub fn contains_field(&self, field: &str) -> bool {
        matches!(self.resolve(field), Ok(Some(_)))
    }

    /// Returns `true` if the document has the top level key.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns the value stored under a top level key without path resolution.
    pub fn entry(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Removes the field at the specified path. Removing an absent field is a no-op.
    ///
    /// A non numeric segment applied to an array removes the remaining path
    /// from every document element of that array.
    pub fn remove(&mut self, key: &str) -> ViewResult<()> {
        if self.is_embedded(key) {
            let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_remove(&splits)
        } else {
            self.data.shift_remove(key);
            Ok(())
        }
    }

    /// Iterates over the top level fields in document order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.data.iter()
    }

    /// Returns the top level keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// Total order used when documents are compared as values: field by field
    /// (name, then value), then by size.
    pub fn total_cmp(&self, other: &Document) -> Ordering {
        for ((ka, va), (kb, vb)) in self.data.iter().zip(other.data.iter()) {
            let cmp = ka.as_bytes().cmp(kb.as_bytes()).then_with(|| va.total_cmp(vb));
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        self.data.len().cmp(&other.data.len())
    }

    /// Parses a JSON object into a document. Extended JSON wrappers are
    /// unwrapped as described on [Value::from_json].
    pub fn from_json(json: serde_json::Value) -> ViewResult<Document> {
        match json {
            serde_json::Value::Object(map) => Document::from_json_map(map),
            other => {
                log::error!("Expected a json object for a document, found {}", other);
                Err(ViewError::new(
                    "Expected a json object for a document",
                    ErrorKind::EncodingError,
                ))
            }
        }
    }

    /// Parses a JSON string into a document.
    pub fn from_json_str(json: &str) -> ViewResult<Document> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Document::from_json(value)
    }

    pub(crate) fn from_json_map(map: serde_json::Map<String, serde_json::Value>) -> ViewResult<Document> {
        let mut data = IndexMap::with_capacity(map.len());
        for (key, value) in map {
            data.insert(key, Value::from_json(value)?);
        }
        Ok(Document { data })
    }

    /// Converts the document into a JSON object, preserving field order.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::with_capacity(self.data.len());
        for (key, value) in self.data.iter() {
            map.insert(key.clone(), value.to_json());
        }
        serde_json::Value::Object(map)
    }

    fn is_embedded(&self, key: &str) -> bool {
        key.contains(FIELD_SEPARATOR)
    }

    fn deep_put(&mut self, splits: &[&str], value: Value) -> ViewResult<()> {
        let key = match splits.first() {
            Some(key) if !key.is_empty() => *key,
            _ => {
                log::error!("Document does not support empty key");
                return Err(ViewError::new(
                    "Document does not support empty key",
                    ErrorKind::InvalidFieldName,
                ));
            }
        };

        if splits.len() == 1 {
            self.data.insert(key.to_string(), value);
            return Ok(());
        }

        let mut nested = match self.data.get(key) {
            Some(Value::Document(obj)) => obj.clone(),
            // a scalar in the way is replaced by a new embedded document
            _ => Document::new(),
        };
        nested.deep_put(&splits[1..], value)?;
        self.data.insert(key.to_string(), Value::Document(nested));
        Ok(())
    }

    fn deep_remove(&mut self, splits: &[&str]) -> ViewResult<()> {
        let key = match splits.first() {
            Some(key) if !key.is_empty() => *key,
            _ => {
                log::error!("Document does not support empty key");
                return Err(ViewError::new(
                    "Document does not support empty key",
                    ErrorKind::InvalidFieldName,
                ));
            }
        };

        if splits.len() == 1 {
            self.data.shift_remove(key);
            return Ok(());
        }

        let remaining = &splits[1..];
        match self.data.get_mut(key) {
            Some(Value::Document(obj)) => obj.deep_remove(remaining),
            Some(Value::Array(arr)) => Document::remove_from_array(arr, remaining),
            _ => Ok(()),
        }
    }

    fn remove_from_array(arr: &mut Vec<Value>, splits: &[&str]) -> ViewResult<()> {
        if let Ok(index) = splits[0].parse::<usize>() {
            if index >= arr.len() {
                return Ok(());
            }
            if splits.len() == 1 {
                arr.remove(index);
                return Ok(());
            }
            return match &mut arr[index] {
                Value::Document(obj) => obj.deep_remove(&splits[1..]),
                Value::Array(inner) => Document::remove_from_array(inner, &splits[1..]),
                _ => Ok(()),
            };
        }

        for item in arr.iter_mut() {
            if let Value::Document(obj) = item {
                obj.deep_remove(splits)?;
            }
        }
        Ok(())
    }

    fn get_by_embedded_key(&self, key: &str) -> ViewResult<Option<Value>> {
        let splits: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
        if splits.iter().any(|s| s.is_empty()) {
            log::error!("Invalid field path {}", key);
            return Err(ViewError::new(
                &format!("Invalid field path {}", key),
                ErrorKind::InvalidFieldName,
            ));
        }

        // get current level value and scan to next level using remaining keys
        Ok(Document::recursive_get(self.data.get(splits[0]), &splits[1..]))
    }

    fn recursive_get(value: Option<&Value>, splits: &[&str]) -> Option<Value> {
        let value = value?;
        if splits.is_empty() {
            return Some(value.clone());
        }

        let key = splits[0];
        match value {
            Value::Document(obj) => Document::recursive_get(obj.data.get(key), &splits[1..]),
            Value::Array(arr) => match key.parse::<usize>() {
                Ok(index) => Document::recursive_get(arr.get(index), &splits[1..]),
                // a non numeric key on an array collects the path from every element
                Err(_) => Document::decompose(arr, splits),
            },
            _ => None,
        }
    }

    fn decompose(arr: &[Value], splits: &[&str]) -> Option<Value> {
        let mut items: Vec<Value> = Vec::with_capacity(arr.len());
        for item in arr {
            match Document::recursive_get(Some(item), splits) {
                Some(Value::Array(values)) => items.extend(values),
                Some(value) => items.push(value),
                None => {}
            }
        }

        if items.is_empty() {
            None
        } else {
            Some(Value::Array(items))
        }
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.data.len() == other.data.len()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
    }
}

impl Eq for Document {}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().collect(),
        }
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string_pretty(&self.to_json()) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => Err(std::fmt::Error),
        }
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// # Examples
///
/// ```rust
/// use docview::doc;
///
/// let empty = doc!{};
///
/// let listing = doc!{
///     name: "Ribeira Charming Duplex",
///     property_type: "House",
///     accommodates: 8,
///     "review_scores.review_scores_cleanliness": 9,
///     amenities: ["TV", "Wifi"],
///     address: {
///         market: "Porto",
///         country_code: "PT"
///     }
/// };
/// assert_eq!(listing.size(), 6);
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::collection::Document::new()
    };

    () => {
        $crate::collection::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put($crate::collection::normalize(stringify!($key)), $crate::doc_value!($value))
                .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Helper macro converting values for the doc! macro.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        {
            $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
        }
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
