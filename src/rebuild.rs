/*!
 * Replays structure and code artifacts under a target directory
 *
 * Hierarchy is recovered from indentation alone: each directory line is
 * placed relative to the previous directory line by comparing connector
 * columns. Lines are applied strictly in artifact order since each one
 * depends on the state left by the lines before it.
 */

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use indicatif::ProgressBar;

use crate::config::Session;
use crate::error::{AppError, Result};
use crate::parser::{code_map, parse_code_blocks, parse_structure, ParsedLine};
use crate::prompt::{Conflict, ConflictDecision, ConflictResolver};
use crate::report::{RebuildOutcome, RebuildReport};
use crate::types::{CodeBlock, NodeKind, INDENT_WIDTH};
use crate::utils::{clear_directory, create_file, slash_path};

/// Tracks the directory new entries belong to
#[derive(Debug, Clone)]
pub struct DirTracker {
    target: PathBuf,
    current_dir: PathBuf,
    previous_column: usize,
}

impl DirTracker {
    /// Start at the target root
    pub fn new(target: impl Into<PathBuf>) -> Self {
        let target = target.into();
        Self {
            current_dir: target.clone(),
            target,
            previous_column: 0,
        }
    }

    /// Directory that the next file line lands in
    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Resolve the path of `parsed` and update the state
    ///
    /// A directory line at column 0 resets to the target. At the same
    /// column as the previous directory line it is a sibling of it; at a
    /// smaller column it ascends one level per indentation unit of
    /// difference, plus the sibling step. At a larger column it is a child
    /// of the previous directory and nothing moves.
    pub fn place(&mut self, parsed: &ParsedLine) -> PathBuf {
        if parsed.line.kind == NodeKind::Directory {
            let column = parsed.column;
            if column == 0 {
                self.current_dir = self.target.clone();
            } else if column <= self.previous_column {
                let levels = (self.previous_column - column) / INDENT_WIDTH + 1;
                for _ in 0..levels {
                    self.pop();
                }
            }
            self.previous_column = column;
        }

        let path = self.current_dir.join(&parsed.line.name);
        if parsed.line.kind == NodeKind::Directory {
            self.current_dir = path.clone();
        }
        path
    }

    fn pop(&mut self) {
        if self.current_dir != self.target {
            self.current_dir.pop();
        }
    }
}

/// Parameters of a rebuild
#[derive(Debug, Clone)]
pub struct RebuildOptions {
    /// Structure artifact
    pub from: PathBuf,
    /// Separate code artifact; the structure artifact is used when absent
    pub from_code: Option<PathBuf>,
    /// Existing directory to rebuild into
    pub to: PathBuf,
    /// Create the listed directories and files
    pub apply_structure: bool,
    /// Fill files from code blocks
    pub apply_code: bool,
}

/// Applies parsed artifacts to the filesystem
pub struct Rebuilder<'a> {
    target: PathBuf,
    code: HashMap<String, String>,
    resolver: &'a mut dyn ConflictResolver,
    progress: Arc<ProgressBar>,
    ask: bool,
    report: RebuildReport,
}

/// What to do with the entry at hand
enum Step {
    Apply,
    Skip,
    Abort,
}

impl<'a> Rebuilder<'a> {
    /// Create a rebuilder for `target`
    pub fn new(
        target: impl Into<PathBuf>,
        code: HashMap<String, String>,
        resolver: &'a mut dyn ConflictResolver,
        progress: Arc<ProgressBar>,
    ) -> Self {
        let target = target.into();
        Self {
            report: RebuildReport::new(&target),
            target,
            code,
            resolver,
            progress,
            ask: true,
        }
    }

    /// Create every listed directory and file
    pub fn apply_structure(mut self, lines: &[ParsedLine]) -> Result<RebuildReport> {
        check_labels(lines)?;
        let start = Instant::now();
        let mut tracker = DirTracker::new(&self.target);

        for parsed in lines {
            let path = tracker.place(parsed);
            let kind = parsed.line.kind;
            log::debug!("{} {}", kind.marker(), path.display());
            self.progress.set_message(path.display().to_string());

            match self.confirm(&path, kind) {
                Step::Apply => match kind {
                    NodeKind::Directory => self.make_dir(&path),
                    NodeKind::File => {
                        let content = self.code_for(&path);
                        let from_code = content.is_some();
                        self.write_file(&path, &content.unwrap_or_default(), from_code);
                    }
                },
                Step::Skip => self.report.skipped += 1,
                Step::Abort => {
                    self.report.outcome = RebuildOutcome::Aborted;
                    break;
                }
            }
            self.progress.inc(1);
        }

        self.report.duration = start.elapsed();
        Ok(self.report)
    }

    /// Write every code block to its path, without a structure listing
    pub fn apply_code_only(mut self, blocks: &[CodeBlock]) -> Result<RebuildReport> {
        check_block_paths(blocks)?;
        let start = Instant::now();

        for block in blocks {
            let path = self.target.join(&block.path);
            self.progress.set_message(path.display().to_string());

            match self.confirm(&path, NodeKind::File) {
                Step::Apply => self.write_file(&path, &block.content, true),
                Step::Skip => self.report.skipped += 1,
                Step::Abort => {
                    self.report.outcome = RebuildOutcome::Aborted;
                    break;
                }
            }
            self.progress.inc(1);
        }

        self.report.duration = start.elapsed();
        Ok(self.report)
    }

    fn confirm(&mut self, path: &Path, kind: NodeKind) -> Step {
        if !self.ask || fs::symlink_metadata(path).is_err() {
            return Step::Apply;
        }

        let conflict = Conflict { path, kind };
        let resolver = &mut *self.resolver;
        let decision = self.progress.suspend(|| resolver.resolve(&conflict));
        log::debug!("{}: {:?}", path.display(), decision);

        match decision {
            ConflictDecision::Overwrite => Step::Apply,
            ConflictDecision::OverwriteAll => {
                self.ask = false;
                Step::Apply
            }
            ConflictDecision::Skip => Step::Skip,
            ConflictDecision::Abort => Step::Abort,
        }
    }

    fn code_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.target).ok()?;
        self.code.get(&slash_path(relative)).cloned()
    }

    fn make_dir(&mut self, path: &Path) {
        let result = (|| -> io::Result<()> {
            if path.is_dir() {
                clear_directory(path)?;
            } else if fs::symlink_metadata(path).is_ok() {
                fs::remove_file(path)?;
            }
            fs::create_dir_all(path)
        })();

        match result {
            Ok(()) => self.report.dirs_created += 1,
            Err(e) => self.fail(AppError::write(path, e)),
        }
    }

    fn write_file(&mut self, path: &Path, content: &str, from_code: bool) {
        let result = (|| -> io::Result<()> {
            if path.is_dir() && !path.is_symlink() {
                fs::remove_dir_all(path)?;
            }
            create_file(path, content)
        })();

        match result {
            Ok(()) => {
                self.report.files_written += 1;
                if from_code {
                    self.report.files_from_code += 1;
                }
            }
            Err(e) => self.fail(AppError::write(path, e)),
        }
    }

    fn fail(&mut self, error: AppError) {
        log::warn!("{}", error);
        self.report.failures.push(error.to_string());
    }
}

fn is_safe_relative(path: &Path) -> bool {
    path.components().count() > 0
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

/// Labels must be plain names so no entry escapes the target
///
/// Only the platform's own separators count, so `a\b.txt` is a valid
/// name on Unix.
fn check_labels(lines: &[ParsedLine]) -> Result<()> {
    for parsed in lines {
        let name = &parsed.line.name;
        crate::ensure!(
            !name.chars().any(std::path::is_separator) && is_safe_relative(Path::new(name)),
            InvalidArgument,
            "Invalid entry name '{}' in structure listing",
            name
        );
    }
    Ok(())
}

/// Every block must land under the target; checked before anything is written
fn check_block_paths(blocks: &[CodeBlock]) -> Result<()> {
    for block in blocks {
        crate::ensure!(
            is_safe_relative(Path::new(&block.path)),
            InvalidArgument,
            "Refusing code block path '{}'",
            block.path
        );
    }
    Ok(())
}

fn read_artifact(path: &Path) -> Result<String> {
    if !path.is_file() {
        return Err(AppError::PathNotFound(path.display().to_string()));
    }
    fs::read_to_string(path).map_err(|e| AppError::read(path, e))
}

/// Rebuild a tree from previously generated artifacts
///
/// Relative paths in `options` resolve against the session root. Missing
/// artifacts or a missing target abort before anything is written.
pub fn rebuild_from_structure(
    session: &Session,
    options: &RebuildOptions,
    resolver: &mut dyn ConflictResolver,
    progress: Arc<ProgressBar>,
) -> Result<RebuildReport> {
    let from = session.resolve(&options.from);
    let from_code = options.from_code.as_deref().map(|p| session.resolve(p));
    let to = session.resolve(&options.to);

    if !to.is_dir() {
        return Err(AppError::PathNotFound(to.display().to_string()));
    }

    let structure_text = if options.apply_structure {
        Some(read_artifact(&from)?)
    } else {
        None
    };

    let code_text = if options.apply_code {
        match &from_code {
            Some(path) => Some(read_artifact(path)?),
            None => match &structure_text {
                Some(text) => Some(text.clone()),
                None => Some(read_artifact(&from)?),
            },
        }
    } else {
        None
    };

    match structure_text {
        Some(text) => {
            let lines = parse_structure(&text);
            let code = code_text.as_deref().map(code_map).unwrap_or_default();
            progress.set_length((lines.len() + code.len()) as u64);
            log::info!(
                "Rebuilding {} entries ({} code blocks) into {}",
                lines.len(),
                code.len(),
                to.display()
            );
            Rebuilder::new(to, code, resolver, progress).apply_structure(&lines)
        }
        None => {
            let blocks = code_text.as_deref().map(parse_code_blocks).unwrap_or_default();
            progress.set_length(blocks.len() as u64);
            log::info!("Writing {} code blocks into {}", blocks.len(), to.display());
            Rebuilder::new(to, HashMap::new(), resolver, progress).apply_code_only(&blocks)
        }
    }
}
