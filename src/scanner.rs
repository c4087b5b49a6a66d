/*!
 * Directory walking for the structure listing
 */

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{AppError, Result};
use crate::rules::{ExclusionPolicy, StructureConfig};
use crate::types::{Entry, NodeKind};

/// Scanner for directory contents
///
/// Produces a pre-order listing where, at every level, files come before
/// subdirectories and each subdirectory is immediately followed by its
/// whole subtree.
pub struct Scanner<'a> {
    /// Scan root
    root: PathBuf,
    /// Exclusion rules
    config: &'a StructureConfig,
    /// Paths never listed (the artifacts of the current run)
    skip: Vec<PathBuf>,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner
    pub fn new(root: impl Into<PathBuf>, config: &'a StructureConfig) -> Self {
        Self {
            root: root.into(),
            config,
            skip: Vec::new(),
        }
    }

    /// Never list `path`, e.g. an artifact this run is about to write
    pub fn skip_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.skip.push(path.into());
        self
    }

    /// Walk the root and return every listed entry in emission order
    pub fn scan(&self) -> Result<Vec<Entry>> {
        if !self.root.is_dir() {
            return Err(AppError::PathNotFound(self.root.display().to_string()));
        }

        let policy = ExclusionPolicy::new(&self.root, self.config);
        let mut entries = Vec::new();
        self.scan_directory(&self.root, &policy, &mut entries)?;

        log::debug!("Walked {} entries under {}", entries.len(), self.root.display());
        Ok(entries)
    }

    fn scan_directory(
        &self,
        dir: &Path,
        policy: &ExclusionPolicy<'_>,
        entries: &mut Vec<Entry>,
    ) -> Result<()> {
        let mut dirs = Vec::new();

        for item in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let item = match item {
                Ok(item) => item,
                Err(e) if dir == self.root => {
                    return Err(AppError::read(dir, e.into()));
                }
                Err(e) => {
                    log::warn!("Error reading entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let path = item.path();
            if self.skip.iter().any(|skipped| skipped == path) {
                continue;
            }

            let kind = if item.file_type().is_dir() {
                NodeKind::Directory
            } else {
                NodeKind::File
            };

            if policy.excluded_from_structure(path, kind) {
                log::debug!("Excluded from structure: {}", path.display());
                continue;
            }

            match kind {
                NodeKind::Directory => dirs.push(path.to_path_buf()),
                NodeKind::File => entries.push(Entry {
                    path: path.to_path_buf(),
                    kind,
                }),
            }
        }

        for sub in dirs {
            entries.push(Entry {
                path: sub.clone(),
                kind: NodeKind::Directory,
            });
            if let Err(e) = self.scan_directory(&sub, policy, entries) {
                log::warn!("Error processing directory {}: {}", sub.display(), e);
            }
        }

        Ok(())
    }
}
