use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for view engine operations.
///
/// # Examples
///
/// ```rust,ignore
/// use docview::errors::{ViewError, ErrorKind, ViewResult};
///
/// fn example() -> ViewResult<()> {
///     Err(ViewError::new("View not found", ErrorKind::NotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    // Definition Errors
    /// Malformed match, project or sort specification, or an unknown stage tag
    InvalidSpec,
    /// A view with the same name is already registered
    DuplicateName,
    /// The requested view does not exist
    NotFound,
    /// Operation not allowed in the current state (e.g. reconfiguring a built registry)
    InvalidOperation,

    // Document Errors
    /// Invalid field name or field path
    InvalidFieldName,

    // Input Errors
    /// Error decoding JSON input
    EncodingError,
    /// Error reading input from disk
    IOError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidSpec => write!(f, "Invalid spec"),
            ErrorKind::DuplicateName => write!(f, "Duplicate name"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::InvalidFieldName => write!(f, "Invalid field name"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::IOError => write!(f, "IO error"),
        }
    }
}

/// Error type of every fallible view engine operation.
///
/// `ViewError` carries a message, an [ErrorKind], an optional cause and the
/// backtrace captured where it was created.
///
/// # Examples
///
/// ```rust,ignore
/// use docview::errors::{ViewError, ErrorKind};
///
/// let err = ViewError::new("Unknown operator $regex", ErrorKind::InvalidSpec);
///
/// let cause = ViewError::new("Unknown operator $regex", ErrorKind::InvalidSpec);
/// let err = ViewError::new_with_cause("Invalid $match stage", ErrorKind::InvalidSpec, cause);
/// ```
#[derive(Clone)]
pub struct ViewError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<ViewError>>,
    backtrace: Atomic<Backtrace>,
}

impl ViewError {
    /// Creates a new `ViewError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        ViewError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `ViewError` wrapping the error that caused it.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: ViewError) -> Self {
        ViewError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&ViewError> {
        self.cause.as_deref()
    }
}

impl Display for ViewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for ViewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for ViewError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for view engine operations.
pub type ViewResult<T> = Result<T, ViewError>;

impl From<std::io::Error> for ViewError {
    fn from(err: std::io::Error) -> Self {
        ViewError::new(&format!("IO error: {}", err), ErrorKind::IOError)
    }
}

impl From<serde_json::Error> for ViewError {
    fn from(err: serde_json::Error) -> Self {
        ViewError::new(
            &format!("JSON decoding error: {}", err),
            ErrorKind::EncodingError,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_error_new_creates_error() {
        let error = ViewError::new("An error occurred", ErrorKind::InvalidSpec);
        assert_eq!(error.message(), "An error occurred");
        assert_eq!(error.kind(), &ErrorKind::InvalidSpec);
        assert!(error.cause().is_none());
        assert!(error.source().is_none());
    }

    #[test]
    fn view_error_new_with_cause_keeps_chain() {
        let root = ViewError::new("Unknown operator $regex", ErrorKind::InvalidSpec);
        let error = ViewError::new_with_cause("Invalid $match stage", ErrorKind::InvalidSpec, root);

        assert!(error.source().is_some());
        assert_eq!(error.cause().map(|c| c.message()), Some("Unknown operator $regex"));

        let formatted = format!("{:?}", error);
        assert!(formatted.contains("Invalid $match stage"));
        assert!(formatted.contains("Caused by:"));
    }

    #[test]
    fn view_error_display_prints_message_only() {
        let error = ViewError::new("View v already exists", ErrorKind::DuplicateName);
        assert_eq!(format!("{}", error), "View v already exists");
    }

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::InvalidSpec.to_string(), "Invalid spec");
        assert_eq!(ErrorKind::DuplicateName.to_string(), "Duplicate name");
        assert_eq!(ErrorKind::NotFound.to_string(), "Not found");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing dump");
        let err: ViewError = io_err.into();
        assert_eq!(err.kind(), &ErrorKind::IOError);
        assert!(err.message().contains("IO error"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ViewError = json_err.into();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
    }

    #[test]
    fn test_question_mark_operator_with_from() {
        fn parse() -> ViewResult<serde_json::Value> {
            Ok(serde_json::from_str("[1, 2")?)
        }
        let result = parse();
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::EncodingError);
    }
}
