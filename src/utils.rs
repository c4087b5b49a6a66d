/*!
 * Utility functions for aktool
 */

use std::fs;
use std::io;
use std::path::{Component, Path};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Separator used by normalized configuration entries
pub const RULE_SEPARATOR: char = '\\';

static CONTROL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x1F]").expect("static control character pattern"));

/// Replace control characters by their escaped spelling, e.g. a newline
/// becomes the two characters `\n`
///
/// Quotes are left as they are. Escaping them would make [`standard_path`]
/// escape its own output again on a second pass.
pub fn escape_special_chars(text: &str) -> String {
    CONTROL_CHARS
        .replace_all(text, |caps: &Captures| {
            let c = caps[0].chars().next().unwrap_or_default();
            match c {
                '\0' => "\\0".to_string(),
                '\n' => "\\n".to_string(),
                '\r' => "\\r".to_string(),
                '\t' => "\\t".to_string(),
                '\u{8}' => "\\b".to_string(),
                '\u{c}' => "\\f".to_string(),
                '\u{b}' => "\\v".to_string(),
                other => format!("\\x{:02x}", other as u32),
            }
        })
        .into_owned()
}

/// Normalize a configuration entry: escape control characters and use
/// [`RULE_SEPARATOR`] between path segments
pub fn standard_path(entry: &str) -> String {
    escape_special_chars(entry).replace('/', &RULE_SEPARATOR.to_string())
}

fn normal_segments(relative: &Path) -> impl Iterator<Item = String> + '_ {
    relative.components().filter_map(|c| match c {
        Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
        _ => None,
    })
}

/// Root-relative path in the form configuration entries are compared in
pub fn rule_key(relative: &Path) -> String {
    normal_segments(relative)
        .collect::<Vec<_>>()
        .join(&RULE_SEPARATOR.to_string())
}

/// Root-relative path with `/` separators, as written in code banners
pub fn slash_path(relative: &Path) -> String {
    normal_segments(relative).collect::<Vec<_>>().join("/")
}

/// Path segments of a root-relative path
pub fn segments(relative: &Path) -> Vec<String> {
    normal_segments(relative).collect()
}

/// Extension including the leading dot, or an empty string
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Base name of a path
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

/// Remove everything inside `dir`, keeping the directory itself
pub fn clear_directory(dir: &Path) -> io::Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() && !path.is_symlink() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }

    Ok(())
}

/// Write `content` to `path`, creating parent directories as needed
pub fn create_file(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_escape_control_chars() {
        assert_eq!(escape_special_chars("a\nb\tc"), "a\\nb\\tc");
        assert_eq!(escape_special_chars("\u{1}"), "\\x01");
        assert_eq!(escape_special_chars("plain"), "plain");
    }

    #[test]
    fn test_quotes_are_not_escaped() {
        assert_eq!(escape_special_chars("it's \"quoted\""), "it's \"quoted\"");
        let once = standard_path("dir/it's");
        assert_eq!(once, "dir\\it's");
        assert_eq!(standard_path(&once), once);
    }

    #[test]
    fn test_standard_path_is_idempotent() {
        for entry in ["src/gen", "a\nb/c", "already\\normal", "tab\there"] {
            let once = standard_path(entry);
            assert_eq!(standard_path(&once), once);
        }
        assert_eq!(standard_path("src/gen/out"), "src\\gen\\out");
    }

    #[test]
    fn test_relative_keys() {
        let rel = PathBuf::from("src").join("sub").join("main.rs");
        assert_eq!(rule_key(&rel), "src\\sub\\main.rs");
        assert_eq!(slash_path(&rel), "src/sub/main.rs");
        assert_eq!(segments(&rel), vec!["src", "sub", "main.rs"]);
    }

    #[test]
    fn test_dotted_extension() {
        assert_eq!(dotted_extension(Path::new("a/script.txt")), ".txt");
        assert_eq!(dotted_extension(Path::new("archive.tar.gz")), ".gz");
        assert_eq!(dotted_extension(Path::new("Makefile")), "");
        assert_eq!(dotted_extension(Path::new(".bashrc")), "");
    }

    #[test]
    fn test_clear_directory_keeps_dir() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("nested"))?;
        fs::write(dir.path().join("nested").join("f.txt"), "x")?;
        fs::write(dir.path().join("top.txt"), "y")?;

        clear_directory(dir.path())?;

        assert!(dir.path().is_dir());
        assert_eq!(fs::read_dir(dir.path())?.count(), 0);
        Ok(())
    }
}
