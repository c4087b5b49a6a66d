/*!
 * Readers for the structure and code artifacts
 */

use std::collections::HashMap;

use crate::types::{
    CodeBlock, NodeKind, TreeLine, BANNER_PATH_PREFIX, BANNER_RULE, CONNECTOR, INDENT_UNIT,
    LABEL_SEPARATOR,
};

/// A tree line as found in an artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Decoded line
    pub line: TreeLine,
    /// Character offset of the connector glyph
    pub column: usize,
}

/// Parse one line of a structure artifact
///
/// Returns `None` for lines that are not tree lines: the header, blank
/// lines, and anything whose first non-indentation character is not the
/// connector.
pub fn parse_tree_line(raw: &str) -> Option<ParsedLine> {
    let raw = raw.strip_suffix('\r').unwrap_or(raw);

    let mut rest = raw;
    let mut units = 0;
    while let Some(stripped) = rest.strip_prefix(INDENT_UNIT) {
        rest = stripped;
        units += 1;
    }

    let column = raw[..raw.len() - rest.len()].chars().count();

    let mut chars = rest.chars();
    if chars.next()? != CONNECTOR {
        return None;
    }
    let kind = NodeKind::from_marker(chars.next()?)?;
    let name = chars.as_str().strip_prefix(LABEL_SEPARATOR)?;
    if name.is_empty() {
        return None;
    }

    Some(ParsedLine {
        line: TreeLine {
            depth: units + 1,
            kind,
            name: name.to_string(),
        },
        column,
    })
}

/// Every tree line of a structure artifact, in order
///
/// Parsing stops at the first code banner so inline code blocks are never
/// mistaken for tree lines.
pub fn parse_structure(text: &str) -> Vec<ParsedLine> {
    let listing = match next_banner(text, 0) {
        Some((start, _, _)) => &text[..start],
        None => text,
    };
    listing.lines().filter_map(parse_tree_line).collect()
}

/// Locate the next banner at or after byte offset `from`
///
/// Returns the banner's start offset, the offset right after it, and the
/// path it names.
fn next_banner(text: &str, from: usize) -> Option<(usize, usize, String)> {
    let mut offset = from;
    while offset <= text.len() {
        let line_end = text[offset..].find('\n').map(|i| offset + i)?;
        let line = text[offset..line_end].trim_end_matches('\r');

        if line == BANNER_RULE {
            if let Some(found) = banner_at(text, offset, line_end + 1) {
                return Some(found);
            }
        }
        offset = line_end + 1;
    }
    None
}

/// Check for `// path` and a closing rule after an opening rule
fn banner_at(text: &str, start: usize, path_start: usize) -> Option<(usize, usize, String)> {
    let path_end = text[path_start..].find('\n').map(|i| path_start + i)?;
    let path_line = text[path_start..path_end].trim_end_matches('\r');
    let path = path_line.strip_prefix(BANNER_PATH_PREFIX)?;

    let rule_start = path_end + 1;
    let rule_end = text[rule_start..]
        .find('\n')
        .map(|i| rule_start + i)
        .unwrap_or(text.len());
    if text[rule_start..rule_end].trim_end_matches('\r') != BANNER_RULE {
        return None;
    }

    let body_start = (rule_end + 1).min(text.len());
    Some((start, body_start, banner_key(path)))
}

/// Banner paths always use `/`; a `\` is only a separator on Windows
#[cfg(windows)]
fn banner_key(path: &str) -> String {
    path.replace('\\', "/")
}

#[cfg(not(windows))]
fn banner_key(path: &str) -> String {
    path.to_string()
}

/// Split a code artifact into blocks
///
/// Text before the first banner (a structure listing, for inline dumps)
/// is ignored. Each block's content runs to the next banner, minus the
/// newline closing the block and the newline separating it from the next.
pub fn parse_code_blocks(text: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current = next_banner(text, 0);

    while let Some((_, body_start, path)) = current {
        let next = next_banner(text, body_start);
        let body = match &next {
            Some((next_start, _, _)) => {
                let body = &text[body_start..*next_start];
                let body = body.strip_suffix('\n').unwrap_or(body);
                body.strip_suffix('\n').unwrap_or(body)
            }
            None => {
                let body = &text[body_start..];
                body.strip_suffix('\n').unwrap_or(body)
            }
        };

        blocks.push(CodeBlock {
            path,
            content: body.to_string(),
        });
        current = next;
    }

    blocks
}

/// Code blocks keyed by their root-relative path
pub fn code_map(text: &str) -> HashMap<String, String> {
    parse_code_blocks(text)
        .into_iter()
        .map(|block| (block.path, block.content))
        .collect()
}
