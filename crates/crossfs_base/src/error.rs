use std::error::Error as StdError;
use std::fmt;
use std::io;

use tracing_error::{SpanTrace, SpanTraceStatus};

use crate::path::FilePath;

/* 📖 # Why a custom error type and not use anyhow/eyre/thiserror etc?

- Callers need to match on the failed operation (a failed copy is not a failed remove)
- The originating io::Error is kept intact so its kind can be inspected
- No dependencies to compile and integrate beyond tracing-error
 */

/// The well-known directories a lookup can fail for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownDirectory {
    Current,
    Home,
    Temp,
}

impl fmt::Display for WellKnownDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WellKnownDirectory::Current => "current",
            WellKnownDirectory::Home => "home",
            WellKnownDirectory::Temp => "temp",
        };
        f.write_str(name)
    }
}

/// Error variants that can occur in crossfs operations.
/// Each variant names the operation that failed and carries the OS error behind it.
#[derive(Debug)]
pub enum ErrorKind {
    /// The OS or environment had no value for a well-known directory
    DirectoryUnavailable { directory: WellKnownDirectory },

    DirectoryCreateFailed { path: FilePath, source: io::Error },

    DirectoryRemoveFailed { path: FilePath, source: io::Error },

    FileReadFailed { path: FilePath, source: io::Error },

    FileWriteFailed { path: FilePath, source: io::Error },

    FileCopyFailed {
        from: FilePath,
        to: FilePath,
        source: io::Error,
    },

    FileMoveFailed {
        from: FilePath,
        to: FilePath,
        source: io::Error,
    },

    FileRemoveFailed { path: FilePath, source: io::Error },

    FileSizeUnavailable { path: FilePath, source: io::Error },

    /// Catch-all for other errors with a message
    Message { message: String },
}

impl ErrorKind {
    /// The OS error behind this kind, if there is one.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            ErrorKind::DirectoryCreateFailed { source, .. }
            | ErrorKind::DirectoryRemoveFailed { source, .. }
            | ErrorKind::FileReadFailed { source, .. }
            | ErrorKind::FileWriteFailed { source, .. }
            | ErrorKind::FileCopyFailed { source, .. }
            | ErrorKind::FileMoveFailed { source, .. }
            | ErrorKind::FileRemoveFailed { source, .. }
            | ErrorKind::FileSizeUnavailable { source, .. } => Some(source),
            ErrorKind::DirectoryUnavailable { .. } | ErrorKind::Message { .. } => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::DirectoryUnavailable { directory } => {
                write!(f, "Could not determine the {} directory", directory)
            }
            ErrorKind::DirectoryCreateFailed { path, source } => {
                write!(f, "Could not create directory {}: {}", path, source)
            }
            ErrorKind::DirectoryRemoveFailed { path, source } => {
                write!(f, "Could not remove directory {}: {}", path, source)
            }
            ErrorKind::FileReadFailed { path, source } => {
                write!(f, "Could not read file {}: {}", path, source)
            }
            ErrorKind::FileWriteFailed { path, source } => {
                write!(f, "Could not write file {}: {}", path, source)
            }
            ErrorKind::FileCopyFailed { from, to, source } => {
                write!(f, "Could not copy {} to {}: {}", from, to, source)
            }
            ErrorKind::FileMoveFailed { from, to, source } => {
                write!(f, "Could not move {} to {}: {}", from, to, source)
            }
            ErrorKind::FileRemoveFailed { path, source } => {
                write!(f, "Could not remove file {}: {}", path, source)
            }
            ErrorKind::FileSizeUnavailable { path, source } => {
                write!(f, "Could not get size of {}: {}", path, source)
            }
            ErrorKind::Message { message } => f.write_str(message),
        }
    }
}

/* 📖 # Why separate ErrorKind and CrossfsError?
ErrorKind is what callers match on: which operation failed, on which path, and why.
CrossfsError wraps it with everything gathered while the error travels up: context
strings, an optional cause and the span trace captured at creation.
*/

/// Comprehensive error type wrapping ErrorKind with context, cause and span trace.
pub struct CrossfsError {
    kind: ErrorKind,
    context: Vec<String>,
    cause: Option<Box<CrossfsError>>,
    span_trace: SpanTrace,
}

impl CrossfsError {
    /// Creates a new error from an ErrorKind, capturing the current span trace.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: vec![],
            cause: None,
            span_trace: SpanTrace::capture(),
        }
    }

    /// Creates a free-form error.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Message {
            message: message.into(),
        })
    }

    /// Attaches context to an error.
    /// Context is displayed before the error message.
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
    pub fn caused_by(mut self, cause: impl Into<Box<CrossfsError>>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// Returns a reference to the underlying ErrorKind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn get_context(&self) -> &[String] {
        &self.context
    }

    pub fn cause(&self) -> Option<&CrossfsError> {
        self.cause.as_deref()
    }

    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
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
        for (index, context) in self.context.iter().enumerate() {
            let branch = if index + 1 == items { "└─" } else { "├─" };
            writeln!(f, "{indent}{branch} {context}")?;
        }
        if let Some(cause) = &self.cause {
            writeln!(f, "{indent}└─ cause: {}", cause.kind)?;
            cause.fmt_tree(f, &format!("{indent}   "))?;
        }
        Ok(())
    }
}

impl From<ErrorKind> for CrossfsError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<ErrorKind> for Box<CrossfsError> {
    fn from(kind: ErrorKind) -> Self {
        Box::new(CrossfsError::new(kind))
    }
}

impl StdError for CrossfsError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => self
                .kind
                .io_error()
                .map(|source| source as &(dyn StdError + 'static)),
        }
    }
}

impl fmt::Display for CrossfsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for context in &self.context {
            write!(f, "{}: ", context)?;
        }
        write!(f, "{}", self.kind)
    }
}

impl fmt::Debug for CrossfsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;
        self.fmt_tree(f, "")?;
        if self.span_trace.status() == SpanTraceStatus::CAPTURED {
            writeln!(f, "Trace: {}", self.span_trace)?;
        }
        Ok(())
    }
}

/* 📖 # Why use Box<CrossfsError> in the result type?

Boxing the error reduces the size of the result type, making it more efficient to return in the common case.

*/

/// Standard result type for crossfs operations.
pub type CrossfsResult<T> = std::result::Result<T, Box<CrossfsError>>;

/// Extension trait for attaching context to Results.
pub trait ResultExt<T> {
    /// Attaches context to an error, consuming and re-wrapping it.
    fn context(self, context: impl Into<String>) -> CrossfsResult<T>;

    /// Attaches context using lazy evaluation.
    /// Context is only evaluated if the result is an error.
    fn with_context<F>(self, f: F) -> CrossfsResult<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for CrossfsResult<T> {
    fn context(self, context: impl Into<String>) -> CrossfsResult<T> {
        self.map_err(|err| Box::new(err.context(context)))
    }

    fn with_context<F>(self, f: F) -> CrossfsResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|err| Box::new(err.with_context(f)))
    }
}

/// Creates a boxed message error from a format string.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        Box::new($crate::CrossfsError::message(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remove_failed(path: &str) -> CrossfsError {
        CrossfsError::new(ErrorKind::FileRemoveFailed {
            path: FilePath::from(path),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
        })
    }

    #[test]
    fn test_error_kind_is_matchable() {
        let error = remove_failed("work/a.txt");
        match error.kind() {
            ErrorKind::FileRemoveFailed { path, source } => {
                assert_eq!(path, &FilePath::from("work/a.txt"));
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("Expected FileRemoveFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_error_display_with_context() {
        let error = CrossfsError::message("root error")
            .context("first")
            .context("second");
        assert_eq!(error.to_string(), "first: second: root error");
    }

    #[test]
    fn test_directory_unavailable_display() {
        let error = CrossfsError::new(ErrorKind::DirectoryUnavailable {
            directory: WellKnownDirectory::Home,
        });
        assert_eq!(error.to_string(), "Could not determine the home directory");
        assert!(error.source().is_none());
    }

    #[test]
    fn test_source_is_io_error() {
        let error = remove_failed("a.txt");
        let source = error.source().expect("io error as source");
        assert_eq!(source.to_string(), "access denied");
        assert_eq!(error.root_cause().to_string(), "access denied");
    }

    #[test]
    fn test_source_prefers_cause() {
        let error = CrossfsError::message("outer").caused_by(remove_failed("a.txt"));
        let source = error.source().expect("cause as source");
        assert!(source.to_string().starts_with("Could not remove file"));
        assert_eq!(error.root_cause().to_string(), "access denied");
    }

    #[test]
    fn test_io_error_accessor() {
        let error = remove_failed("a.txt");
        assert_eq!(
            error.kind().io_error().map(io::Error::kind),
            Some(io::ErrorKind::PermissionDenied)
        );
        assert!(CrossfsError::message("x").kind().io_error().is_none());
    }

    #[test]
    fn test_boxed_from_kind() {
        fn fails() -> CrossfsResult<()> {
            let result: Result<(), ErrorKind> = Err(ErrorKind::Message {
                message: "boom".to_string(),
            });
            result?;
            Ok(())
        }
        assert_eq!(fails().unwrap_err().to_string(), "boom");
    }

    #[test]
    fn test_result_ext_lazy_context_not_evaluated_on_success() {
        let result: CrossfsResult<u32> = Ok(7);
        let value = result
            .with_context(|| panic!("must not be evaluated"))
            .unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_err_macro() {
        let error: Box<CrossfsError> = crate::err!("bad value {}", 42);
        assert_eq!(error.to_string(), "bad value 42");
    }
}
