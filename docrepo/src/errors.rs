use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for repository and driver operations.
///
/// Every failure surfaced by this crate falls in exactly one of these
/// categories, so callers can branch on the category without parsing messages.
///
/// # Examples
///
/// ```rust
/// use docrepo::errors::{DocRepoError, DocRepoResult, ErrorKind};
///
/// fn lookup() -> DocRepoResult<()> {
///     Err(DocRepoError::new("document 'u1' not found", ErrorKind::NotFound))
/// }
///
/// assert_eq!(lookup().unwrap_err().kind(), &ErrorKind::NotFound);
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// Invalid wiring: empty collection name, unknown alias or repository type
    ConfigurationError,
    /// The requested document or collection does not exist
    NotFound,
    /// Revision mismatch, failed revision precondition or duplicate id
    Conflict,
    /// Transport or driver level failure
    IOError,
    /// Malformed id or document payload
    InvalidArgument,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::ConfigurationError => write!(f, "Configuration error"),
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::Conflict => write!(f, "Conflict"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::InvalidArgument => write!(f, "Invalid argument"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type of the crate.
///
/// `DocRepoError` carries a message, an [ErrorKind], an optional cause and the
/// backtrace captured where it was created.
///
/// # Examples
///
/// ```rust
/// use docrepo::errors::{DocRepoError, ErrorKind};
///
/// let cause = DocRepoError::new("connection reset", ErrorKind::IOError);
/// let err = DocRepoError::new_with_cause("fetch failed", ErrorKind::IOError, cause);
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct DocRepoError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<DocRepoError>>,
    backtrace: Atomic<Backtrace>,
}

impl DocRepoError {
    /// Creates a new error with the specified message and kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        DocRepoError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new error that wraps `cause`.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: DocRepoError) -> Self {
        DocRepoError {
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

    pub fn cause(&self) -> Option<&DocRepoError> {
        self.cause.as_deref()
    }

    /// Returns `true` if this error is a [ErrorKind::NotFound].
    pub fn is_not_found(&self) -> bool {
        self.error_kind == ErrorKind::NotFound
    }

    /// Returns `true` if this error is a [ErrorKind::Conflict].
    pub fn is_conflict(&self) -> bool {
        self.error_kind == ErrorKind::Conflict
    }
}

impl Display for DocRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for DocRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // message with stack trace, or the cause chain
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for DocRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// Result type alias used by every fallible operation of the crate.
pub type DocRepoResult<T> = Result<T, DocRepoError>;

/// Every io failure of a driver is a transport failure, whatever its io kind.
/// A missing file or socket must never read as a missing document.
impl From<std::io::Error> for DocRepoError {
    fn from(err: std::io::Error) -> Self {
        DocRepoError::new(&format!("IO error: {}", err), ErrorKind::IOError)
    }
}

impl From<serde_json::Error> for DocRepoError {
    fn from(err: serde_json::Error) -> Self {
        let error_kind = if err.is_io() {
            ErrorKind::IOError
        } else {
            ErrorKind::InvalidArgument
        };
        DocRepoError::new(&format!("JSON error: {}", err), error_kind)
    }
}
