use crate::common::FIELD_SEPARATOR;
use crate::errors::{ErrorKind, ViewError, ViewResult};

/// Checks that a field path used in a pipeline spec is a valid dotted path:
/// non empty, with no empty segment.
pub fn validate_field_path(path: &str) -> ViewResult<()> {
    if path.is_empty() || path.split(FIELD_SEPARATOR).any(|segment| segment.is_empty()) {
        log::error!("Invalid field path '{}'", path);
        return Err(ViewError::new(
            &format!("Invalid field path '{}'", path),
            ErrorKind::InvalidSpec,
        ));
    }
    Ok(())
}

/// Returns `true` if `path` equals `prefix` or lies below it
/// (`address.market` is covered by `address`).
pub fn is_path_covered_by(path: &str, prefix: &str) -> bool {
    path == prefix
        || (path.len() > prefix.len()
            && path.starts_with(prefix)
            && path[prefix.len()..].starts_with(FIELD_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_field_path() {
        assert!(validate_field_path("price").is_ok());
        assert!(validate_field_path("review_scores.review_scores_cleanliness").is_ok());
        assert_eq!(validate_field_path("").unwrap_err().kind(), &ErrorKind::InvalidSpec);
        assert!(validate_field_path(".price").is_err());
        assert!(validate_field_path("price.").is_err());
        assert!(validate_field_path("a..b").is_err());
    }

    #[test]
    fn test_is_path_covered_by() {
        assert!(is_path_covered_by("address", "address"));
        assert!(is_path_covered_by("address.market", "address"));
        assert!(!is_path_covered_by("address_line", "address"));
        assert!(!is_path_covered_by("address", "address.market"));
    }
}
