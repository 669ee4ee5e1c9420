use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

use crate::common::{Value, OPERATOR_PREFIX};
use crate::errors::{ErrorKind, ViewError, ViewResult};

/// Comparison operators a match condition can apply.
///
/// Ordering operators (`Gt`, `Gte`, `Lt`, `Lte`) only hold between values of
/// the same kind; comparing a string with a number never matches. `Eq` and
/// `Ne` use strict, type-sensitive equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Ne,
}

impl ComparisonOp {
    /// Parses an operator name. The `$` prefix of the aggregation syntax is optional.
    ///
    /// # Errors
    ///
    /// Returns [ErrorKind::InvalidSpec] for an unknown operator name.
    pub fn from_name(name: &str) -> ViewResult<ComparisonOp> {
        let bare = name.strip_prefix(OPERATOR_PREFIX).unwrap_or(name);
        match bare {
            "gt" => Ok(ComparisonOp::Gt),
            "gte" => Ok(ComparisonOp::Gte),
            "lt" => Ok(ComparisonOp::Lt),
            "lte" => Ok(ComparisonOp::Lte),
            "eq" => Ok(ComparisonOp::Eq),
            "ne" => Ok(ComparisonOp::Ne),
            _ => {
                log::error!("Unknown comparison operator {}", name);
                Err(ViewError::new(
                    &format!("Unknown comparison operator {}", name),
                    ErrorKind::InvalidSpec,
                ))
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ComparisonOp::Gt => "gt",
            ComparisonOp::Gte => "gte",
            ComparisonOp::Lt => "lt",
            ComparisonOp::Lte => "lte",
            ComparisonOp::Eq => "eq",
            ComparisonOp::Ne => "ne",
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Eq => "==",
            ComparisonOp::Ne => "!=",
        }
    }

    /// Applies the operator to a resolved field value and the condition operand.
    pub fn apply(&self, value: &Value, operand: &Value) -> bool {
        match self {
            ComparisonOp::Eq => value == operand,
            ComparisonOp::Ne => value != operand,
            ordering_op => match value.compare_same_type(operand) {
                Some(ordering) => match ordering_op {
                    ComparisonOp::Gt => ordering == Ordering::Greater,
                    ComparisonOp::Gte => ordering != Ordering::Less,
                    ComparisonOp::Lt => ordering == Ordering::Less,
                    _ => ordering != Ordering::Greater,
                },
                None => false,
            },
        }
    }
}

impl FromStr for ComparisonOp {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComparisonOp::from_name(s)
    }
}

/// Condition a single field path must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Literal equality (type-sensitive).
    Equals(Value),
    /// Named comparison operator with its operand.
    Compare { op: ComparisonOp, value: Value },
}

impl Condition {
    /// Evaluates the condition against a resolved field value. Missing fields
    /// are passed in as [Value::Null].
    #[inline]
    pub fn apply(&self, value: &Value) -> bool {
        match self {
            Condition::Equals(expected) => value == expected,
            Condition::Compare { op, value: operand } => op.apply(value, operand),
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Equals(value) => write!(f, "== {}", value),
            Condition::Compare { op, value } => write!(f, "{} {}", op.symbol(), value),
        }
    }
}
