use crate::common::Value;

use super::{ComparisonOp, Condition};

/// Creates a fluent condition builder for the specified field path.
///
/// # Examples
///
/// ```rust,ignore
/// use docview::filter::{field, MatchSpec};
///
/// let spec = MatchSpec::new()
///     .and(field("property_type").eq("Apartment"))
///     .and(field("accommodates").gt(4));
/// ```
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// A fluent builder for a condition on one field path.
pub struct FluentFilter {
    field_name: String,
}

/// A field path paired with the condition it must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCondition {
    pub(crate) field_name: String,
    pub(crate) condition: Condition,
}

impl FieldCondition {
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }
}

impl FluentFilter {
    /// Literal, type-sensitive equality.
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> FieldCondition {
        self.with(Condition::Equals(value.into()))
    }

    #[inline]
    pub fn ne<T: Into<Value>>(self, value: T) -> FieldCondition {
        self.compare(ComparisonOp::Ne, value)
    }

    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> FieldCondition {
        self.compare(ComparisonOp::Gt, value)
    }

    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> FieldCondition {
        self.compare(ComparisonOp::Gte, value)
    }

    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> FieldCondition {
        self.compare(ComparisonOp::Lt, value)
    }

    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> FieldCondition {
        self.compare(ComparisonOp::Lte, value)
    }

    /// Condition with an explicit comparison operator.
    pub fn compare<T: Into<Value>>(self, op: ComparisonOp, value: T) -> FieldCondition {
        self.with(Condition::Compare { op, value: value.into() })
    }

    fn with(self, condition: Condition) -> FieldCondition {
        FieldCondition {
            field_name: self.field_name,
            condition,
        }
    }
}
