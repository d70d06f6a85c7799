//! Centralized error handling for the editor core
//! Defines common error types, severity levels, and error codes

use std::fmt;

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational message (not really an error)
    Info,
    /// Warning - something might be wrong but the editor can continue
    Warning,
    /// Standard error - operation failed but editor can continue
    Error,
    /// Critical error - may indicate a broken invariant
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Category of the error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A transaction committed against a read-only buffer
    ReadOnly,
    /// A buffer id did not resolve to a live buffer
    NoSuchBuffer,
    /// A weak buffer handle could not be upgraded; the buffer was killed
    BufferKilled,
    /// A keybinding description could not be parsed
    ParseKey,
    /// A key sequence matched no binding and was not printable
    InvalidKeyCombo,
    /// The token cache failed to converge while re-tokenizing
    TokenizerDivergence,
    /// Errors that don't fit the categories above
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "ReadOnly"),
            Self::NoSuchBuffer => write!(f, "NoSuchBuffer"),
            Self::BufferKilled => write!(f, "BufferKilled"),
            Self::ParseKey => write!(f, "ParseKey"),
            Self::InvalidKeyCombo => write!(f, "InvalidKeyCombo"),
            Self::TokenizerDivergence => write!(f, "TokenizerDivergence"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// A structured error produced anywhere in the editor core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorError {
    pub severity: ErrorSeverity,
    pub kind: ErrorKind,
    pub message: String,
}

impl EditorError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Error,
            kind,
            message: message.into(),
        }
    }

    pub fn warning(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Warning,
            kind,
            message: message.into(),
        }
    }

    pub fn critical(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            severity: ErrorSeverity::Critical,
            kind,
            message: message.into(),
        }
    }

    pub fn read_only() -> Self {
        Self::new(ErrorKind::ReadOnly, "buffer is read-only")
    }

    pub fn no_such_buffer() -> Self {
        Self::new(ErrorKind::NoSuchBuffer, "no buffer with that id")
    }

    pub fn buffer_killed() -> Self {
        Self::warning(ErrorKind::BufferKilled, "buffer handle was killed")
    }

    pub fn parse_key(description: impl Into<String>) -> Self {
        Self::critical(ErrorKind::ParseKey, description)
    }

    pub fn invalid_key_combo(description: impl Into<String>) -> Self {
        Self::warning(ErrorKind::InvalidKeyCombo, description)
    }

    pub fn tokenizer_divergence(description: impl Into<String>) -> Self {
        Self::warning(ErrorKind::TokenizerDivergence, description)
    }
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.kind, self.message)
    }
}

impl std::error::Error for EditorError {}

impl From<String> for EditorError {
    fn from(msg: String) -> Self {
        Self::new(ErrorKind::Other, msg)
    }
}

impl From<&str> for EditorError {
    fn from(msg: &str) -> Self {
        Self::new(ErrorKind::Other, msg)
    }
}

/// Result alias for editor core operations
pub type Result<T> = std::result::Result<T, EditorError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
