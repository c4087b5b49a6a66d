/*!
 * Confirmation before destructive overwrites
 */

use std::fmt;
use std::path::Path;

use inquire::Select;

use crate::types::NodeKind;

/// An existing entry the rebuild is about to replace
#[derive(Debug, Clone, Copy)]
pub struct Conflict<'a> {
    /// Path that already exists
    pub path: &'a Path,
    /// What the rebuild wants to put there
    pub kind: NodeKind,
}

/// Answer to a [`Conflict`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictDecision {
    /// Replace this entry
    Overwrite,
    /// Replace this entry and every later one without asking again
    OverwriteAll,
    /// Leave this entry as it is and continue
    Skip,
    /// Stop the rebuild
    Abort,
}

impl ConflictDecision {
    const ALL: [Self; 4] = [Self::Overwrite, Self::OverwriteAll, Self::Skip, Self::Abort];
}

impl fmt::Display for ConflictDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Overwrite => "Overwrite",
            Self::OverwriteAll => "Overwrite all remaining",
            Self::Skip => "Skip this one",
            Self::Abort => "Abort",
        };
        f.write_str(label)
    }
}

/// Decides what happens to existing entries during a rebuild
pub trait ConflictResolver {
    /// Called once per existing entry until [`ConflictDecision::OverwriteAll`]
    fn resolve(&mut self, conflict: &Conflict<'_>) -> ConflictDecision;
}

// Implement ConflictResolver for closures
impl<F> ConflictResolver for F
where
    F: FnMut(&Conflict<'_>) -> ConflictDecision,
{
    fn resolve(&mut self, conflict: &Conflict<'_>) -> ConflictDecision {
        self(conflict)
    }
}

/// Overwrites everything without asking
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl ConflictResolver for AssumeYes {
    fn resolve(&mut self, _conflict: &Conflict<'_>) -> ConflictDecision {
        ConflictDecision::OverwriteAll
    }
}

/// Asks on the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl ConflictResolver for TerminalPrompt {
    fn resolve(&mut self, conflict: &Conflict<'_>) -> ConflictDecision {
        let message = match conflict.kind {
            NodeKind::Directory => format!(
                "The contents of directory {} will be deleted",
                conflict.path.display()
            ),
            NodeKind::File => format!("File {} will be overwritten", conflict.path.display()),
        };

        match Select::new(&message, ConflictDecision::ALL.to_vec()).prompt() {
            Ok(decision) => decision,
            Err(e) => {
                log::warn!("No answer for {}: {}", conflict.path.display(), e);
                ConflictDecision::Abort
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_resolver() {
        let mut seen = Vec::new();
        let mut resolver = |conflict: &Conflict<'_>| {
            seen.push(conflict.path.to_path_buf());
            ConflictDecision::Skip
        };

        let conflict = Conflict {
            path: Path::new("/tmp/x"),
            kind: NodeKind::File,
        };
        assert_eq!(resolver.resolve(&conflict), ConflictDecision::Skip);
        drop(resolver);
        assert_eq!(seen, vec![Path::new("/tmp/x").to_path_buf()]);
    }

    #[test]
    fn test_assume_yes() {
        let conflict = Conflict {
            path: Path::new("/tmp/x"),
            kind: NodeKind::Directory,
        };
        assert_eq!(AssumeYes.resolve(&conflict), ConflictDecision::OverwriteAll);
    }

    #[test]
    fn test_decision_labels() {
        let labels: Vec<String> = ConflictDecision::ALL.iter().map(|d| d.to_string()).collect();
        assert_eq!(
            labels,
            vec!["Overwrite", "Overwrite all remaining", "Skip this one", "Abort"]
        );
    }
}
