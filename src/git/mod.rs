/*!
 * Git repository handling functionality
 */

mod error;
mod repository;

// Re-export public items
pub use error::{GitError, GitResult};
pub use repository::{within_prefix, Repository};
