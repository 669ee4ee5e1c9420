use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt::Display;

use crate::collection::Document;
use crate::common::{validate_field_path, SortOrder, Value};
use crate::errors::{ErrorKind, ViewError, ViewResult};

/// Ordered `(field path, direction)` pairs of a sort stage. Earlier pairs take
/// precedence; later pairs break ties.
///
/// # Examples
///
/// ```rust,ignore
/// use docview::sort::{sort, SortSpec};
/// use docview::SortOrder;
///
/// let spec = SortSpec::by("price", SortOrder::Descending).then_by("name", SortOrder::Ascending);
/// let ordered = sort(documents, &spec)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    fields: Vec<(String, SortOrder)>,
}

impl SortSpec {
    /// Starts a spec with its primary sort key.
    pub fn by(field_name: &str, order: SortOrder) -> Self {
        SortSpec {
            fields: vec![(field_name.to_string(), order)],
        }
    }

    /// Adds a tie-breaking sort key.
    pub fn then_by(mut self, field_name: &str, order: SortOrder) -> Self {
        self.fields.push((field_name.to_string(), order));
        self
    }

    /// Builds a spec from pairs. An empty list is rejected.
    pub fn from_pairs<I, S>(pairs: I) -> ViewResult<Self>
    where
        I: IntoIterator<Item = (S, SortOrder)>,
        S: Into<String>,
    {
        let spec = SortSpec {
            fields: pairs.into_iter().map(|(f, o)| (f.into(), o)).collect(),
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn fields(&self) -> &[(String, SortOrder)] {
        &self.fields
    }

    pub fn validate(&self) -> ViewResult<()> {
        if self.fields.is_empty() {
            log::error!("Sort spec must name at least one field");
            return Err(ViewError::new(
                "Sort spec must name at least one field",
                ErrorKind::InvalidSpec,
            ));
        }
        for (field_name, _) in &self.fields {
            validate_field_path(field_name)?;
        }
        Ok(())
    }

    /// Parses the JSON form of a sort stage body, e.g. `{"price": -1}`.
    /// Directions may be `1`/`-1` or `"asc"`/`"desc"`.
    pub fn from_json(json: &serde_json::Value) -> ViewResult<SortSpec> {
        let object = json.as_object().ok_or_else(|| {
            log::error!("Sort spec must be an object, found {}", json);
            ViewError::new("Sort spec must be an object", ErrorKind::InvalidSpec)
        })?;

        let mut pairs = Vec::with_capacity(object.len());
        for (field_name, direction) in object {
            let order = match direction {
                serde_json::Value::Number(n) => {
                    // exporters may write 1 and -1 as floats
                    let value = n
                        .as_i64()
                        .or_else(|| n.as_f64().filter(|d| d.fract() == 0.0).map(|d| d as i64))
                        .unwrap_or(0);
                    SortOrder::from_direction(value)?
                }
                serde_json::Value::String(name) => SortOrder::from_name(name)?,
                other => {
                    log::error!("Invalid sort direction {} for field {}", other, field_name);
                    return Err(ViewError::new(
                        &format!("Invalid sort direction {} for field {}", other, field_name),
                        ErrorKind::InvalidSpec,
                    ));
                }
            };
            pairs.push((field_name.clone(), order));
        }
        SortSpec::from_pairs(pairs)
    }
}

impl Display for SortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (name, order)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, order.direction())?;
        }
        write!(f, "}}")
    }
}

/// Resolved sort key values of one document, inline for typical specs.
type SortKeys = SmallVec<[Value; 4]>;

/// Compares two sort key values. Null and missing values are least in both
/// directions; the direction only flips the order of present values.
fn compare_keys(a: &Value, b: &Value, order: SortOrder) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => {
            let cmp = a.total_cmp(b);
            match order {
                SortOrder::Ascending => cmp,
                SortOrder::Descending => cmp.reverse(),
            }
        }
    }
}

/// Sorts documents by the spec. The sort is stable: documents with equal
/// keys keep their input order.
pub fn sort(documents: Vec<Document>, spec: &SortSpec) -> ViewResult<Vec<Document>> {
    spec.validate()?;

    // resolve every key once, so the comparator never fails
    let mut keyed: Vec<(SortKeys, Document)> = Vec::with_capacity(documents.len());
    for document in documents {
        let mut keys = SortKeys::with_capacity(spec.fields.len());
        for (field_name, _) in &spec.fields {
            keys.push(document.get(field_name)?);
        }
        keyed.push((keys, document));
    }

    keyed.sort_by(|(a, _), (b, _)| {
        for (i, (_, order)) in spec.fields.iter().enumerate() {
            let cmp = compare_keys(&a[i], &b[i], *order);
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    });

    Ok(keyed.into_iter().map(|(_, document)| document).collect())
}
