use crate::errors::{ErrorKind, ViewError, ViewResult};

/// Specifies the direction for sorting documents.
///
/// # Variants
/// - `Ascending`: Sort from smallest to largest value (A to Z, 0 to 9)
/// - `Descending`: Sort from largest to smallest value (Z to A, 9 to 0)
///
/// Direction only flips the order of present values. Missing and null fields
/// sort first in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in ascending order
    Ascending,
    /// Sort in descending order
    Descending,
}

impl SortOrder {
    /// Parses the numeric direction used by aggregation sort stages
    /// (`1` ascending, `-1` descending).
    pub fn from_direction(direction: i64) -> ViewResult<SortOrder> {
        match direction {
            1 => Ok(SortOrder::Ascending),
            -1 => Ok(SortOrder::Descending),
            other => {
                log::error!("Sort direction must be 1 or -1, found {}", other);
                Err(ViewError::new(
                    &format!("Sort direction must be 1 or -1, found {}", other),
                    ErrorKind::InvalidSpec,
                ))
            }
        }
    }

    /// Parses a textual direction (`asc`, `ascending`, `desc`, `descending`).
    pub fn from_name(name: &str) -> ViewResult<SortOrder> {
        match name.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => {
                log::error!("Unknown sort direction {}", other);
                Err(ViewError::new(
                    &format!("Unknown sort direction {}", other),
                    ErrorKind::InvalidSpec,
                ))
            }
        }
    }

    pub fn direction(&self) -> i64 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}
