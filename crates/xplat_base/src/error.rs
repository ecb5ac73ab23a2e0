use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use tracing_error::{SpanTrace, SpanTraceStatus};

/* 📖 # Why one error type for paths and filesystems?

Callers of xplat usually chain a path operation into a filesystem operation
(`processor.join(..)?` then `fs.read_file(..)?`). A single error type keeps those
chains free of conversions, while `ErrorKind` still lets callers match on the
failure category (missing entry, malformed path, impossible relative path, ...).
*/

/// Failure categories of path and filesystem operations.
#[derive(Debug)]
pub enum ErrorKind {
    /// The entry (or one of its ancestors) does not exist
    NotExist { path: String },

    /// The entry was expected to be absent
    AlreadyExists { path: String },

    /// The input could not be parsed as a path
    InvalidPath { path: String, reason: String },

    /// The operation is not valid for the entry or handle state
    InvalidOperation {
        op: &'static str,
        path: String,
        reason: String,
    },

    /// A relative path between the two inputs can not be computed lexically
    Relative {
        from: String,
        to: String,
        reason: String,
    },

    /// Native file operation failed
    FileError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Catch-all for other errors with a message
    Message { message: String },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotExist { path } => write!(f, "'{}' does not exist", path),
            ErrorKind::AlreadyExists { path } => write!(f, "'{}' already exists", path),
            ErrorKind::InvalidPath { path, reason } => {
                write!(f, "invalid path '{}': {}", path.escape_debug(), reason)
            }
            ErrorKind::InvalidOperation { op, path, reason } => {
                write!(f, "invalid {} on '{}': {}", op, path, reason)
            }
            ErrorKind::Relative { from, to, reason } => {
                write!(f, "can't make '{}' relative to '{}': {}", to, from, reason)
            }
            ErrorKind::FileError { path, source } => {
                write!(f, "File error at {}: {}", path.display(), source)
            }
            ErrorKind::Message { message } => write!(f, "{}", message),
        }
    }
}

/// Error wrapping an [`ErrorKind`] with context, an optional cause and the span
/// trace active when it was created.
pub struct XplatError {
    kind: ErrorKind,
    context: Vec<String>,
    cause: Option<Box<XplatError>>,
    span_trace: SpanTrace,
}

/// Standard result type for xplat operations.
pub type XplatResult<T> = std::result::Result<T, Box<XplatError>>;

impl XplatError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
            cause: None,
            span_trace: SpanTrace::capture(),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    pub fn not_exist(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotExist { path: path.into() })
    }

    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyExists { path: path.into() })
    }

    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        })
    }

    pub fn invalid_operation(
        op: &'static str,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::InvalidOperation {
            op,
            path: path.into(),
            reason: reason.into(),
        })
    }

    pub fn relative(
        from: impl Into<String>,
        to: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::Relative {
            from: from.into(),
            to: to.into(),
            reason: reason.into(),
        })
    }

    pub fn file_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::new(ErrorKind::FileError {
            path: path.into(),
            source,
        })
    }

    /// Attaches context to an error.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Attaches context using lazy evaluation.
    pub fn with_context<F>(mut self, f: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.context.push(f());
        self
    }

    /// Records the error that led to this one.
    pub fn caused_by(mut self, cause: impl Into<Box<XplatError>>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn get_context(&self) -> &[String] {
        &self.context
    }

    pub fn cause(&self) -> Option<&XplatError> {
        self.cause.as_deref()
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    pub fn is_not_exist(&self) -> bool {
        match &self.kind {
            ErrorKind::NotExist { .. } => true,
            ErrorKind::FileError { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Returns the innermost error in the chain.
    pub fn root_cause(&self) -> &(dyn StdError + 'static) {
        let mut current: &(dyn StdError + 'static) = self;
        while let Some(next) = current.source() {
            current = next;
        }
        current
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: &str) -> fmt::Result {
        let items = self.context.len() + usize::from(self.cause.is_some());
        for (i, ctx) in self.context.iter().enumerate() {
            let branch = if i + 1 == items { "└─" } else { "├─" };
            writeln!(f, "{}{} {}", indent, branch, ctx)?;
        }
        if let Some(cause) = &self.cause {
            writeln!(f, "{}└─ cause: {}", indent, cause.kind)?;
            cause.fmt_tree(f, &format!("{}   ", indent))?;
        }
        Ok(())
    }
}

impl From<ErrorKind> for XplatError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<ErrorKind> for Box<XplatError> {
    fn from(kind: ErrorKind) -> Self {
        Box::new(XplatError::new(kind))
    }
}

impl StdError for XplatError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.kind {
            ErrorKind::FileError { source, .. } => Some(source),
            _ => self
                .cause
                .as_deref()
                .map(|cause| cause as &(dyn StdError + 'static)),
        }
    }
}

impl fmt::Display for XplatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ctx in &self.context {
            write!(f, "{}: ", ctx)?;
        }
        write!(f, "{}", self.kind)
    }
}

/* 📖 # Why a hand-written Debug?

`unwrap()` in tests and `{:?}` in logs are where errors are read most. The tree
layout shows message, context, causes and the span trace without the noise of a
derived struct dump.
*/
impl fmt::Debug for XplatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;
        self.fmt_tree(f, "")?;
        if self.span_trace.status() == SpanTraceStatus::CAPTURED {
            writeln!(f, "Trace: {}", self.span_trace)?;
        }
        Ok(())
    }
}

/// Extension trait for attaching context to results.
pub trait ResultExt<T> {
    /// Attaches context to an error, evaluated eagerly.
    fn context(self, context: impl Into<String>) -> XplatResult<T>;

    /// Attaches context only if the result is an error.
    fn with_context<F>(self, f: F) -> XplatResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for XplatResult<T> {
    fn context(self, context: impl Into<String>) -> XplatResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> XplatResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}

/// Builds a boxed message error from format arguments.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::XplatError::message(format!($($arg)*)))
    };
}

/// Returns early with a boxed message error.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::err!($($arg)*))
    };
}
