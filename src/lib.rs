/*!
 * mkctx - Pick project files and assemble them into Markdown for LLM context
 *
 * This library builds a navigable tree from a project's file list, runs an
 * interactive selection session over it, and streams the selected files
 * into one Markdown document with collision-safe code fences.
 */

pub mod classify;
pub mod config;
pub mod error;
pub mod fence;
pub mod git;
pub mod language;
pub mod report;
pub mod scanner;
pub mod session;
pub mod tree;
pub mod tui;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use classify::{BinaryClassifier, BinaryDescriber, ContentSniffer, FileCommand};
pub use config::Config;
pub use error::{MkctxError, Result};
pub use fence::Fence;
pub use report::{AssemblyReport, ReportFormat, Reporter};
pub use scanner::Scanner;
pub use session::{Command, Event, Session, StatusInfo};
pub use tree::{build_tree, Tree, TreeBuilder};
pub use types::{Node, NodeId, NodeKind, Outcome};
pub use writer::MarkdownWriter;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
