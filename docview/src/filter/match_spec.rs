use itertools::Itertools;
use std::fmt::Display;

use crate::collection::Document;
use crate::common::{validate_field_path, Value, OPERATOR_PREFIX};
use crate::errors::{ErrorKind, ViewError, ViewResult};

use super::{field, ComparisonOp, Condition, FieldCondition};

/// Conjunction of field conditions evaluated against one document.
///
/// Every condition must hold for a document to match; an empty spec matches
/// every document. A field path that does not resolve is compared as
/// [Value::Null].
///
/// # Examples
///
/// ```rust,ignore
/// use docview::filter::{field, MatchSpec};
///
/// let spec = MatchSpec::new()
///     .and(field("property_type").eq("Apartment"))
///     .and(field("review_scores.review_scores_cleanliness").eq(10))
///     .and(field("accommodates").gt(4));
///
/// assert!(spec.matches(&listing)?);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSpec {
    conditions: Vec<FieldCondition>,
}

impl MatchSpec {
    /// Creates an empty spec that matches every document.
    pub fn new() -> Self {
        MatchSpec {
            conditions: Vec::new(),
        }
    }

    /// Adds a condition to the conjunction.
    pub fn and(mut self, condition: FieldCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Adds a condition given the operator by name (`"gt"` or `"$gt"`).
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidSpec] for an unknown operator or an invalid field path.
    pub fn with_operator<T: Into<Value>>(self, field_name: &str, op: &str, value: T) -> ViewResult<Self> {
        validate_field_path(field_name)?;
        let op = ComparisonOp::from_name(op)?;
        Ok(self.and(field(field_name).compare(op, value)))
    }

    pub fn conditions(&self) -> &[FieldCondition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Distinct field paths referenced by the spec, in spec order.
    pub fn fields(&self) -> Vec<&str> {
        self.conditions
            .iter()
            .map(|c| c.field_name.as_str())
            .unique()
            .collect()
    }

    /// Checks every field path of the spec.
    pub fn validate(&self) -> ViewResult<()> {
        for condition in &self.conditions {
            validate_field_path(&condition.field_name)?;
        }
        Ok(())
    }

    /// Evaluates the spec against a document.
    pub fn matches(&self, document: &Document) -> ViewResult<bool> {
        for condition in &self.conditions {
            let value = document.get(&condition.field_name)?;
            if !condition.condition.apply(&value) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Parses the JSON form of a match stage body.
    ///
    /// Each key is a field path. A plain value (including an object without
    /// `$` keys) is a literal equality; an object whose keys are all operators
    /// (`{"$gt": 4, "$lte": 8}`) adds one comparison per operator.
    pub fn from_json(json: &serde_json::Value) -> ViewResult<MatchSpec> {
        let object = json.as_object().ok_or_else(|| {
            log::error!("Match spec must be an object, found {}", json);
            ViewError::new("Match spec must be an object", ErrorKind::InvalidSpec)
        })?;

        let mut spec = MatchSpec::new();
        for (field_name, condition) in object {
            validate_field_path(field_name)?;
            match operator_entries(condition)? {
                Some(operators) => {
                    for (op, operand) in operators {
                        let op = ComparisonOp::from_name(op)?;
                        let operand = Value::from_json(operand.clone())?;
                        spec = spec.and(field(field_name).compare(op, operand));
                    }
                }
                None => {
                    let literal = Value::from_json(condition.clone())?;
                    spec = spec.and(field(field_name).eq(literal));
                }
            }
        }
        Ok(spec)
    }
}

/// Returns the operator entries of a condition object, or `None` if the
/// condition is a literal.
fn operator_entries(condition: &serde_json::Value) -> ViewResult<Option<Vec<(&String, &serde_json::Value)>>> {
    let object = match condition.as_object() {
        Some(object) if !object.is_empty() => object,
        _ => return Ok(None),
    };

    if object.len() == 1 && object.keys().all(|k| Value::is_extended_json_key(k)) {
        return Ok(None);
    }

    let operator_count = object.keys().filter(|k| k.starts_with(OPERATOR_PREFIX)).count();
    if operator_count == 0 {
        Ok(None)
    } else if operator_count == object.len() {
        Ok(Some(object.iter().collect()))
    } else {
        log::error!("Cannot mix operators and fields in condition {}", condition);
        Err(ViewError::new(
            "Cannot mix operators and fields in a match condition",
            ErrorKind::InvalidSpec,
        ))
    }
}

/// Evaluates `spec` against `document`.
pub fn matches(document: &Document, spec: &MatchSpec) -> ViewResult<bool> {
    spec.matches(document)
}

impl Display for MatchSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.conditions.is_empty() {
            return write!(f, "(all)");
        }
        let conditions = self
            .conditions
            .iter()
            .map(|c| format!("({} {})", c.field_name, c.condition))
            .join(" && ");
        write!(f, "{}", conditions)
    }
}
