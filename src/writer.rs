/*!
 * Structure artifact writer
 *
 * Renders a walked entry list as indented tree text, optionally followed
 * (or accompanied, in a second artifact) by banner-delimited code blocks.
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::ValueEnum;
use rayon::prelude::*;

use crate::config::Session;
use crate::error::{AppError, Result};
use crate::report::GenerateReport;
use crate::rules::{ExclusionPolicy, StructureConfig};
use crate::scanner::Scanner;
use crate::types::{CodeBlock, Entry, NodeKind, TreeLine, STRUCTURE_HEADER};
use crate::utils::{base_name, slash_path};

/// Where file contents go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CodeMode {
    /// Structure listing only
    #[default]
    None,
    /// Code blocks appended to the structure artifact
    Inline,
    /// Code blocks in a second artifact
    Separate,
}

/// Rendered artifacts of one generation run
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    /// Content of the structure artifact
    pub structure: String,
    /// Content of the separate code artifact, when any block went there
    pub code: Option<String>,
    /// Number of tree lines
    pub tree_lines: usize,
    /// Number of code blocks emitted
    pub code_blocks: usize,
    /// Files whose content could not be read
    pub failures: Vec<String>,
}

/// Writer for structure artifacts
pub struct StructureWriter<'a> {
    /// Root the entries were walked from
    root: &'a Path,
    /// Exclusion rules (only the code rules matter here)
    config: &'a StructureConfig,
}

impl<'a> StructureWriter<'a> {
    /// Create a new writer
    pub fn new(root: &'a Path, config: &'a StructureConfig) -> Self {
        Self { root, config }
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(self.root).unwrap_or(path)
    }

    /// Tree line for a walked entry
    pub fn tree_line(&self, entry: &Entry) -> TreeLine {
        TreeLine {
            depth: self.relative(&entry.path).components().count(),
            kind: entry.kind,
            name: base_name(&entry.path),
        }
    }

    /// Render the artifacts for `entries`
    pub fn render(&self, entries: &[Entry], mode: CodeMode) -> Rendered {
        let lines: Vec<String> = entries
            .iter()
            .map(|entry| self.tree_line(entry).to_string())
            .collect();

        let mut parts = Vec::with_capacity(lines.len() + 2);
        parts.push(format!("{}\n", STRUCTURE_HEADER));
        parts.extend(lines.iter().cloned());
        parts.push("\n".to_string());

        let mut rendered = Rendered {
            tree_lines: lines.len(),
            ..Rendered::default()
        };

        if mode != CodeMode::None {
            let blocks = self.code_blocks(entries, &mut rendered.failures);
            rendered.code_blocks = blocks.len();
            let blocks: Vec<String> = blocks.iter().map(CodeBlock::render).collect();

            match mode {
                CodeMode::Inline => parts.extend(blocks),
                CodeMode::Separate if !blocks.is_empty() => {
                    rendered.code = Some(blocks.join("\n"));
                }
                _ => {}
            }
        }

        rendered.structure = parts.join("\n");
        rendered
    }

    /// Read the content of every file that is not excluded from the dump
    ///
    /// Reads run in parallel; the result keeps walk order.
    fn code_blocks(&self, entries: &[Entry], failures: &mut Vec<String>) -> Vec<CodeBlock> {
        let policy = ExclusionPolicy::new(self.root, self.config);

        let results: Vec<Result<CodeBlock>> = entries
            .par_iter()
            .filter(|entry| entry.kind == NodeKind::File)
            .filter(|entry| !policy.excluded_from_code(&entry.path, entry.kind))
            .map(|entry| {
                let content = fs::read_to_string(&entry.path)
                    .map_err(|e| AppError::read(&entry.path, e))?;
                Ok(CodeBlock {
                    path: slash_path(self.relative(&entry.path)),
                    content,
                })
            })
            .collect();

        let mut blocks = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(block) => blocks.push(block),
                Err(e) => {
                    log::warn!("{}", e);
                    failures.push(e.to_string());
                }
            }
        }
        blocks
    }
}

/// Parameters of a generation run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Code handling
    pub mode: CodeMode,
    /// Structure artifact path
    pub structure_out: PathBuf,
    /// Separate code artifact path
    pub code_out: PathBuf,
}

impl GenerateOptions {
    /// Default artifact locations under the session root
    pub fn new(session: &Session, mode: CodeMode) -> Self {
        Self {
            mode,
            structure_out: session.structure_artifact(),
            code_out: session.code_artifact(),
        }
    }
}

/// Walk the session root and write the structure artifacts
pub fn generate_structure(session: &Session, options: &GenerateOptions) -> Result<GenerateReport> {
    let start = Instant::now();
    let config = session.load_structure_config()?;

    let entries = Scanner::new(session.root(), &config)
        .skip_path(&options.structure_out)
        .skip_path(&options.code_out)
        .scan()?;

    let writer = StructureWriter::new(session.root(), &config);
    let rendered = writer.render(&entries, options.mode);

    fs::write(&options.structure_out, &rendered.structure)
        .map_err(|e| AppError::write(&options.structure_out, e))?;
    log::info!("Structure written to {}", options.structure_out.display());

    let code_file = match &rendered.code {
        Some(code) => {
            fs::write(&options.code_out, code).map_err(|e| AppError::write(&options.code_out, e))?;
            log::info!("Code written to {}", options.code_out.display());
            Some(options.code_out.clone())
        }
        None => None,
    };

    Ok(GenerateReport {
        structure_file: options.structure_out.clone(),
        code_file,
        tree_lines: rendered.tree_lines,
        code_blocks: rendered.code_blocks,
        failures: rendered.failures,
        duration: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn setup() -> io::Result<tempfile::TempDir> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("a.txt"), "hello")?;
        fs::create_dir(dir.path().join("sub"))?;
        fs::write(dir.path().join("sub").join("b.txt"), "world")?;
        Ok(dir)
    }

    fn entries(root: &Path) -> Vec<Entry> {
        vec![
            Entry {
                path: root.join("a.txt"),
                kind: NodeKind::File,
            },
            Entry {
                path: root.join("sub"),
                kind: NodeKind::Directory,
            },
            Entry {
                path: root.join("sub").join("b.txt"),
                kind: NodeKind::File,
            },
        ]
    }

    #[test]
    fn test_tree_lines() -> io::Result<()> {
        let dir = setup()?;
        let config = StructureConfig::default();
        let writer = StructureWriter::new(dir.path(), &config);
        let rendered = writer.render(&entries(dir.path()), CodeMode::None);

        assert_eq!(
            rendered.structure,
            "=== Structure du projet ===\n\n├F─ a.txt\n├D─ sub\n│   ├F─ b.txt\n\n"
        );
        assert_eq!(rendered.tree_lines, 3);
        assert!(rendered.code.is_none());
        Ok(())
    }

    #[test]
    fn test_separate_code_blocks() -> io::Result<()> {
        let dir = setup()?;
        let config = StructureConfig::default();
        let writer = StructureWriter::new(dir.path(), &config);
        let rendered = writer.render(&entries(dir.path()), CodeMode::Separate);

        assert_eq!(rendered.code_blocks, 2);
        assert_eq!(
            rendered.code.as_deref(),
            Some(
                "///////////////////////////\n// a.txt\n///////////////////////////\nhello\n\n\
                 ///////////////////////////\n// sub/b.txt\n///////////////////////////\nworld\n"
            )
        );
        assert!(!rendered.structure.contains("hello"));
        Ok(())
    }

    #[test]
    fn test_inline_code_blocks_follow_listing() -> io::Result<()> {
        let dir = setup()?;
        let config = StructureConfig::default();
        let writer = StructureWriter::new(dir.path(), &config);
        let rendered = writer.render(&entries(dir.path()), CodeMode::Inline);

        assert!(rendered.code.is_none());
        let listing_end = rendered.structure.find("│   ├F─ b.txt").unwrap();
        let first_block = rendered.structure.find("// a.txt").unwrap();
        assert!(listing_end < first_block);
        assert!(rendered.structure.ends_with("world\n"));
        Ok(())
    }

    #[test]
    fn test_unreadable_file_is_reported_not_fatal() -> io::Result<()> {
        let dir = setup()?;
        let config = StructureConfig::default();
        let writer = StructureWriter::new(dir.path(), &config);

        let mut listed = entries(dir.path());
        listed.push(Entry {
            path: dir.path().join("gone.txt"),
            kind: NodeKind::File,
        });
        let rendered = writer.render(&listed, CodeMode::Separate);

        assert_eq!(rendered.code_blocks, 2);
        assert_eq!(rendered.failures.len(), 1);
        assert!(rendered.failures[0].contains("gone.txt"));
        Ok(())
    }
}
