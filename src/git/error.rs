/*!
 * Error types for Git operations
 */

use thiserror::Error;

/// Errors that can occur during Git operations
#[derive(Error, Debug)]
pub enum GitError {
    /// Error discovering or opening a repository
    #[error("Failed to open repository: {0}")]
    OpenError(git2::Error),

    /// Error reading the index or the work tree status
    #[error("Failed to list repository files: {0}")]
    ListError(git2::Error),

    /// IO error during Git operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A path inside the repository is not valid UTF-8
    #[error("Non UTF-8 path in repository: {0}")]
    InvalidPath(String),

    /// A directory that is not inside the work tree
    #[error("{0} is outside of the repository work tree")]
    OutsideWorkdir(String),
}

/// Specialized Result type for Git operations
pub type GitResult<T> = Result<T, GitError>;
