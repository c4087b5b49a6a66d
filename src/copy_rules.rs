/*!
 * Copy rules: mirror a saved file elsewhere with extra lines injected
 */

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::config::Session;
use crate::error::{AppError, Result};
use crate::report::CopyReport;
use crate::samples::{COPY_RULE_KEY, COPY_RULE_SCHEMA};
use crate::schema;
use crate::utils::{create_file, slash_path};

#[derive(Debug, Default, Deserialize)]
struct RawCopyRule {
    source: Option<String>,
    destination: Option<String>,
    injection: Option<Vec<Option<RawInjection>>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawInjection {
    text: Option<String>,
    position: Option<f64>,
}

/// A line inserted into the copy
#[derive(Debug, Clone, PartialEq)]
pub struct Injection {
    /// Inserted line
    pub text: String,
    /// 1-based line number; negative values count from the end
    pub position: i64,
}

/// One configured copy
#[derive(Debug, Clone, PartialEq)]
pub struct CopyRule {
    /// Root-relative path of the watched file, `/`-separated
    pub source: String,
    /// Root-relative path of the copy
    pub destination: String,
    /// Lines to insert, applied in order
    pub injections: Vec<Injection>,
}

impl CopyRule {
    /// Read every usable rule from a configuration document
    ///
    /// Rules without a source or destination are dropped.
    pub fn from_document(document: &Value) -> Vec<Self> {
        let section = document.get(COPY_RULE_KEY).unwrap_or(&Value::Null);
        let coerced = schema::validate(section, &COPY_RULE_SCHEMA);

        let raw: Vec<Option<RawCopyRule>> = serde_json::from_value(coerced).unwrap_or_else(|e| {
            log::warn!("Discarding copy rules: {}", e);
            Vec::new()
        });

        let rules: Vec<Self> = raw.into_iter().flatten().filter_map(Self::from_raw).collect();
        if rules.is_empty() {
            log::warn!("Configuration section '{}' is invalid or empty", COPY_RULE_KEY);
        }
        rules
    }

    fn from_raw(raw: RawCopyRule) -> Option<Self> {
        let source = raw.source.filter(|s| !s.is_empty())?;
        let destination = raw.destination.filter(|d| !d.is_empty())?;
        let injections = raw
            .injection
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter_map(|injection| {
                Some(Injection {
                    text: injection.text?,
                    position: injection.position?.round() as i64,
                })
            })
            .collect();

        Some(Self {
            source: source.replace('\\', "/"),
            destination: destination.replace('\\', "/"),
            injections,
        })
    }

    /// Whether this rule watches `relative` (a `/`-separated path)
    pub fn applies_to(&self, relative: &str) -> bool {
        self.source.trim_start_matches("./") == relative.trim_start_matches("./")
    }
}

/// Insert each injection into `lines`, in order
///
/// Position `p > 0` inserts before line `p` (appending when past the
/// end), `p < 0` inserts at `len + 1 + p` counted from the current length,
/// and `p == 0` is ignored.
pub fn apply_injections(lines: &mut Vec<String>, injections: &[Injection]) {
    for injection in injections {
        let len = lines.len() as i64;
        let index = match injection.position {
            0 => continue,
            p if p > 0 => (p - 1).min(len),
            p => (len + 1 + p).max(0),
        };
        lines.insert(index as usize, injection.text.clone());
    }
}

fn inject(content: &str, injections: &[Injection]) -> String {
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    apply_injections(&mut lines, injections);
    lines.join("\n")
}

fn relative_source(session: &Session, file: &Path) -> Result<String> {
    let absolute = session.resolve(file);
    let relative = absolute.strip_prefix(session.root()).map_err(|_| {
        crate::error!(
            InvalidArgument,
            "'{}' is outside the project root {}",
            file.display(),
            session.root().display()
        )
    })?;
    Ok(slash_path(relative))
}

/// Apply every copy rule whose source is `file`
pub fn copy_saved_file(session: &Session, file: &Path) -> Result<CopyReport> {
    session.validate()?;
    let source = relative_source(session, file)?;
    let source_path = session.resolve(Path::new(&source));

    let rules: Vec<CopyRule> = session
        .load_copy_rules()
        .into_iter()
        .filter(|rule| rule.applies_to(&source))
        .collect();

    let mut report = CopyReport {
        source: source_path.clone(),
        ..CopyReport::default()
    };
    if rules.is_empty() {
        log::info!("No copy rule for {}", source);
        return Ok(report);
    }

    let content = fs::read_to_string(&source_path).map_err(|e| AppError::read(&source_path, e))?;

    for rule in &rules {
        let destination: PathBuf = session.resolve(Path::new(&rule.destination));
        match create_file(&destination, &inject(&content, &rule.injections)) {
            Ok(()) => {
                log::info!("Copied {} to {}", source, destination.display());
                report.written.push(destination);
            }
            Err(e) => {
                let error = AppError::write(&destination, e);
                log::warn!("{}", error);
                report.failures.push(error.to_string());
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CONFIG_FILE_NAME;
    use crate::samples::example_document;
    use serde_json::json;

    fn injection(text: &str, position: i64) -> Injection {
        Injection {
            text: text.to_string(),
            position,
        }
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_positive_positions() {
        let mut content = lines(&["a", "b"]);
        apply_injections(&mut content, &[injection("top", 1), injection("far", 99)]);
        assert_eq!(content, lines(&["top", "a", "b", "far"]));
    }

    #[test]
    fn test_negative_positions() {
        let mut content = lines(&["a", "b"]);
        apply_injections(&mut content, &[injection("end", -1), injection("first", -99)]);
        assert_eq!(content, lines(&["first", "a", "b", "end"]));

        let mut content = lines(&["a", "b"]);
        apply_injections(&mut content, &[injection("before-last", -2)]);
        assert_eq!(content, lines(&["a", "before-last", "b"]));
    }

    #[test]
    fn test_zero_position_is_ignored() {
        let mut content = lines(&["a"]);
        apply_injections(&mut content, &[injection("never", 0)]);
        assert_eq!(content, lines(&["a"]));
    }

    #[test]
    fn test_rules_from_sample_document() {
        let rules = CopyRule::from_document(&example_document());
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].source, "example/script.js");
        assert_eq!(rules[0].injections, vec![
            injection("// injected at the top", 1),
            injection("// injected at the end", -1),
        ]);
    }

    #[test]
    fn test_malformed_rules_are_dropped() {
        let document = json!({
            "CopyRule": [
                { "source": 5, "destination": "x" },
                { "source": "a.txt", "destination": "b.txt", "injection": [{ "text": "t", "position": 1.6 }] },
                "garbage"
            ]
        });
        let rules = CopyRule::from_document(&document);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].injections[0].position, 2);
        assert!(CopyRule::from_document(&json!({ "CopyRule": "nope" })).is_empty());
    }

    #[test]
    fn test_copy_saved_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("src"))?;
        fs::write(dir.path().join("src").join("app.js"), "let a = 1;\nlet b = 2;")?;
        let config = json!({
            "CopyRule": [{
                "source": "src/app.js",
                "destination": "out/app.copy.js",
                "injection": [{ "text": "// header", "position": 1 }]
            }]
        });
        fs::write(dir.path().join(CONFIG_FILE_NAME), config.to_string())?;

        let session = Session::new(dir.path());
        let report = copy_saved_file(&session, Path::new("src/app.js"))?;

        assert_eq!(report.written, vec![dir.path().join("out").join("app.copy.js")]);
        assert!(report.failures.is_empty());
        assert_eq!(
            fs::read_to_string(dir.path().join("out").join("app.copy.js"))?,
            "// header\nlet a = 1;\nlet b = 2;"
        );
        Ok(())
    }

    #[test]
    fn test_unmatched_file_is_a_no_op() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let session = Session::new(dir.path());
        let report = copy_saved_file(&session, Path::new("missing.txt"))?;
        assert!(report.written.is_empty());
        Ok(())
    }
}
