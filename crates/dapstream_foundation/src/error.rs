//! Error types for the dapstream engine.
//!
//! Every fallible operation in the workspace returns [`Result`]. The
//! [`ErrorKind`] says what went wrong; an optional [`ErrorContext`] says
//! which request or variable it happened to.

use std::fmt;

use thiserror::Error;

use crate::types::TypeKind;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for dapstream operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The failure class.
    pub kind: ErrorKind,
    /// Where the error arose, if recorded.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Wraps a kind with no context.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Attaches where the error arose, replacing any earlier context.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates an internal (contract violation) error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Creates a parse error without source position.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseError {
            message: message.into(),
            line: 0,
            column: 0,
            context: String::new(),
        })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: TypeKind, actual: TypeKind) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an undefined variable error.
    #[must_use]
    pub fn undefined_variable(path: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndefinedVariable(path.into()))
    }

    /// Creates an undefined function error.
    #[must_use]
    pub fn undefined_function(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UndefinedFunction(name.into()))
    }

    /// Creates a data source failure for the given variable.
    #[must_use]
    pub fn data_source(variable: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataSource {
            variable: variable.into(),
            message: message.into(),
        })
    }

    /// Creates a stream framing error.
    #[must_use]
    pub fn framing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Framing(message.into()))
    }

    /// Creates an invalid array constraint error.
    #[must_use]
    pub fn invalid_constraint(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConstraint(message.into()))
    }

    /// Returns true if this is a parse error.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(self.kind, ErrorKind::ParseError { .. })
    }

    /// Returns true if this is an internal (contract violation) error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self.kind, ErrorKind::Internal(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(err.to_string()))
    }
}

/// What went wrong.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Malformed constraint or declaration text.
    #[error("parse error at {line}:{column}: {message}")]
    ParseError {
        /// What the parser expected or found.
        message: String,
        /// Line number (1-indexed, 0 when unknown).
        line: u32,
        /// Column number (1-indexed, 0 when unknown).
        column: u32,
        /// The offending line of source text.
        context: String,
    },

    /// A value of the wrong kind was stored into a variable.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The kind the variable was declared with.
        expected: TypeKind,
        /// The kind of the value offered.
        actual: TypeKind,
    },

    /// A variable path did not resolve.
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    /// A function name is not registered.
    #[error("undefined function: {0}")]
    UndefinedFunction(String),

    /// An array constraint violated `0 <= start <= stop < size` or `stride >= 1`.
    #[error("invalid constraint: {0}")]
    InvalidConstraint(String),

    /// The external read hook reported a failure.
    #[error("data source error for {variable}: {message}")]
    DataSource {
        /// Path of the variable being read.
        variable: String,
        /// Message reported by the source.
        message: String,
    },

    /// Unexpected bytes while decoding a frame.
    #[error("framing error: {0}")]
    Framing(String),

    /// Transport failure.
    #[error("I/O error: {0}")]
    Io(String),

    /// Semantic validation failed.
    #[error("semantic check failed: {}", .0.join("; "))]
    Semantics(Vec<String>),

    /// A response grew past the configured byte budget.
    #[error("response too big: limit is {limit} bytes")]
    ResponseTooBig {
        /// The configured limit.
        limit: u64,
    },

    /// Schema snapshot encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Contract violation (should not happen with well-formed callers).
    #[error("internal error: {0}")]
    Internal(String),
}

/// The request, variable or text position an error belongs to.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Dataset or request the error belongs to.
    pub source: Option<String>,
    /// Line number in constraint or declaration text.
    pub line: Option<usize>,
    /// Column number in constraint or declaration text.
    pub column: Option<usize>,
    /// Variable path frames, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// An empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source (dataset or request).
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Records a 1-based line and column.
    #[must_use]
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Adds a frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            if let (Some(line), Some(col)) = (self.line, self.column) {
                write!(f, ":{line}:{col}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
