/*!
 * Core types and wire constants for the structure artifacts
 */

use std::fmt;
use std::path::PathBuf;

/// First line of every structure artifact
pub const STRUCTURE_HEADER: &str = "=== Structure du projet ===";

/// One level of indentation in a tree line
pub const INDENT_UNIT: &str = "│   ";

/// Width of [`INDENT_UNIT`] in characters
pub const INDENT_WIDTH: usize = 4;

/// Branch glyph that precedes the node marker
pub const CONNECTOR: char = '├';

/// Glyphs between the marker and the label
pub const LABEL_SEPARATOR: &str = "─ ";

/// Top and bottom line of a code block banner
pub const BANNER_RULE: &str = "///////////////////////////";

/// Prefix of the path line inside a banner
pub const BANNER_PATH_PREFIX: &str = "// ";

/// Default file name of the structure artifact
pub const STRUCTURE_FILE_NAME: &str = "project_structure.txt";

/// Default file name of the separate code artifact
pub const CODE_FILE_NAME: &str = "project_code.txt";

/// Kind of a node in the structure listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File,
}

impl NodeKind {
    /// One-character marker used in tree lines
    pub fn marker(self) -> char {
        match self {
            Self::Directory => 'D',
            Self::File => 'F',
        }
    }

    /// Parse a marker character
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            'D' => Some(Self::Directory),
            'F' => Some(Self::File),
            _ => None,
        }
    }
}

/// A walked filesystem entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Absolute path
    pub path: PathBuf,
    /// Whether this is a directory or a file
    pub kind: NodeKind,
}

/// One line of the structure listing
///
/// Depth is 1 for entries directly under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    pub depth: usize,
    pub kind: NodeKind,
    pub name: String,
}

impl TreeLine {
    /// Number of indentation units before the connector
    pub fn indent_units(&self) -> usize {
        self.depth.saturating_sub(1)
    }

    /// Character offset of the connector glyph
    pub fn connector_column(&self) -> usize {
        self.indent_units() * INDENT_WIDTH
    }
}

impl fmt::Display for TreeLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            INDENT_UNIT.repeat(self.indent_units()),
            CONNECTOR,
            self.kind.marker(),
            LABEL_SEPARATOR,
            self.name
        )
    }
}

/// A file's content keyed by its root-relative path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Root-relative path with `/` separators
    pub path: String,
    /// Full text content
    pub content: String,
}

impl CodeBlock {
    /// Three-line banner introducing this block
    pub fn banner(&self) -> String {
        format!(
            "{rule}\n{prefix}{path}\n{rule}",
            rule = BANNER_RULE,
            prefix = BANNER_PATH_PREFIX,
            path = self.path
        )
    }

    /// Banner followed by the content and a terminating newline
    pub fn render(&self) -> String {
        format!("{}\n{}\n", self.banner(), self.content)
    }
}
