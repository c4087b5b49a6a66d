/*!
 * Configuration handling for aktool
 */

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use serde_json::Value;

use crate::copy_rules::CopyRule;
use crate::error::{AppError, Result};
use crate::rules::StructureConfig;
use crate::types::{CODE_FILE_NAME, STRUCTURE_FILE_NAME};
use crate::writer::CodeMode;

/// Default configuration file name, looked up in the project root
pub const CONFIG_FILE_NAME: &str = "akTool.config.json";

/// Command-line arguments for aktool
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "aktool",
    version = env!("CARGO_PKG_VERSION"),
    about = "Snapshot a directory tree into plain text and rebuild it elsewhere",
    long_about = "Writes a flat, indented listing of a project (optionally with the content of its files) and replays such a listing to recreate the tree under another directory."
)]
pub struct Args {
    /// Project root (defaults to the current directory)
    #[clap(long, global = true)]
    pub root: Option<PathBuf>,

    /// Configuration file (defaults to <root>/akTool.config.json)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[clap(short, long, global = true)]
    pub quiet: bool,

    #[clap(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write the structure listing of the project root
    Generate {
        /// Include file contents, inline or in a separate file
        #[clap(long, value_enum, default_value_t = CodeMode::default())]
        code: CodeMode,

        /// Structure artifact path (defaults to <root>/project_structure.txt)
        #[clap(long)]
        structure_out: Option<PathBuf>,

        /// Code artifact path (defaults to <root>/project_code.txt)
        #[clap(long)]
        code_out: Option<PathBuf>,
    },

    /// Recreate a tree from a structure listing
    Rebuild {
        /// Structure artifact to read
        #[clap(long)]
        from: PathBuf,

        /// Separate code artifact (defaults to the structure artifact)
        #[clap(long)]
        from_code: Option<PathBuf>,

        /// Existing directory to rebuild into
        #[clap(long)]
        to: PathBuf,

        /// Do not create the listed directories and files
        #[clap(long)]
        no_structure: bool,

        /// Do not fill files from code blocks
        #[clap(long)]
        no_code: bool,

        /// Overwrite existing entries without asking
        #[clap(long, short = 'y')]
        yes: bool,
    },

    /// Write an example configuration file
    Init {
        /// Replace an existing configuration file
        #[clap(long)]
        force: bool,
    },

    /// Apply the copy rules whose source is FILE
    Copy {
        /// Root-relative path of the saved file
        file: PathBuf,
    },

    /// Print a shell completion script
    Completions {
        #[clap(value_enum)]
        shell: Shell,
    },
}

/// Explicit context for every core operation
///
/// Carries the project root and the configuration file location; the
/// configuration itself is read fresh on each load.
#[derive(Debug, Clone)]
pub struct Session {
    root: PathBuf,
    config_file: PathBuf,
}

impl Session {
    /// Create a session rooted at `root`, using the default config file
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let config_file = root.join(CONFIG_FILE_NAME);
        Self { root, config_file }
    }

    /// Create a session from command-line arguments
    pub fn from_args(args: &Args) -> Result<Self> {
        let root = match &args.root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };
        let session = Self::new(root);
        Ok(match &args.config {
            Some(config) => {
                let config_file = session.resolve(config);
                session.with_config_file(config_file)
            }
            None => session,
        })
    }

    /// Use a different configuration file
    pub fn with_config_file(mut self, config_file: impl Into<PathBuf>) -> Self {
        self.config_file = config_file.into();
        self
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configuration file location
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Resolve a user-supplied path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Default structure artifact path
    pub fn structure_artifact(&self) -> PathBuf {
        self.root.join(STRUCTURE_FILE_NAME)
    }

    /// Default code artifact path
    pub fn code_artifact(&self) -> PathBuf {
        self.root.join(CODE_FILE_NAME)
    }

    /// Validate that the session can be used
    pub fn validate(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(AppError::PathNotFound(format!(
                "Project root not found: {}",
                self.root.display()
            )));
        }
        Ok(())
    }

    /// Read the configuration document
    ///
    /// A missing or unparseable file yields `null` with a warning, which
    /// the loaders downgrade to empty rule sets.
    pub fn load_document(&self) -> Value {
        let content = match fs::read_to_string(&self.config_file) {
            Ok(content) => content,
            Err(e) => {
                log::warn!(
                    "Configuration file '{}' not readable: {}",
                    self.config_file.display(),
                    e
                );
                return Value::Null;
            }
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!(
                "Configuration file '{}' is not valid JSON: {}",
                self.config_file.display(),
                e
            );
            Value::Null
        })
    }

    /// Load the exclusion rules
    pub fn load_structure_config(&self) -> Result<StructureConfig> {
        self.validate()?;
        Ok(StructureConfig::from_document(&self.load_document()))
    }

    /// Load the copy rules
    pub fn load_copy_rules(&self) -> Vec<CopyRule> {
        CopyRule::from_document(&self.load_document())
    }
}
