//! Global error handling for mkctx
//!
//! Every failure in mkctx is fatal: errors are propagated up to `main`,
//! which restores the terminal, prints a diagnostic and exits non-zero.

use std::io;
use thiserror::Error;

use crate::git::GitError;

/// Global error type for mkctx operations
#[derive(Error, Debug)]
pub enum MkctxError {
    /// Git-related errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Directory walk errors
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// The file list cannot form a tree
    #[error("Tree error: {0}")]
    Tree(String),

    /// An external command failed
    #[error("Command error: {0}")]
    Command(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A path that cannot be represented as UTF-8
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The input event source failed or ran dry
    #[error("Event source error: {0}")]
    EventSource(String),
}

/// Specialized Result type for mkctx operations
pub type Result<T> = std::result::Result<T, MkctxError>;

/// Creates a MkctxError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::MkctxError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for attaching the failing path or operation to IO errors
pub trait ResultExt<T> {
    /// Wrap an IO error with additional context, keeping its kind
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display;
}

impl<T> ResultExt<T> for std::result::Result<T, io::Error> {
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: std::fmt::Display,
    {
        self.map_err(|e| {
            let context = f();
            MkctxError::Io(io::Error::new(e.kind(), format!("{}: {}", context, e)))
        })
    }
}
