/*!
 * aktool - Snapshot a directory tree into plain text and rebuild it elsewhere
 *
 * This library writes an indented listing of a project (optionally with the
 * content of its files) and replays such a listing to recreate the tree
 * under another directory.
 */

pub mod config;
pub mod copy_rules;
pub mod error;
pub mod parser;
pub mod pattern;
pub mod prompt;
pub mod rebuild;
pub mod report;
pub mod rules;
pub mod samples;
pub mod scanner;
pub mod schema;
pub mod types;
pub mod utils;
pub mod writer;


// Re-export main components for easier access
pub use config::{Args, Command, Session};
pub use copy_rules::{copy_saved_file, CopyRule};
pub use error::{AppError, Result};
pub use prompt::{AssumeYes, ConflictDecision, ConflictResolver, TerminalPrompt};
pub use rebuild::{rebuild_from_structure, RebuildOptions};
pub use report::{GenerateReport, RebuildOutcome, RebuildReport, Reporter};
pub use rules::StructureConfig;
pub use scanner::Scanner;
pub use schema::{OnTypeMismatch, Schema};
pub use writer::{generate_structure, CodeMode, GenerateOptions};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
