/*!
 * Wildcard matching for file-name exclusion rules
 *
 * Only `*` is special. The supported shapes are `*text*` (contains),
 * `*text` (suffix), `text*` (prefix), any other placement of one or more
 * `*` (anchored segments scanned left to right), and plain names
 * (exact equality).
 */

/// Wildcard character
const WILDCARD: char = '*';

/// Check whether `name` matches `pattern`
pub fn matches(name: &str, pattern: &str) -> bool {
    let starts = pattern.starts_with(WILDCARD);
    let ends = pattern.ends_with(WILDCARD);

    // *text*
    if starts && ends && pattern.len() > 1 && pattern.matches(WILDCARD).count() == 2 {
        return name.contains(&pattern[1..pattern.len() - 1]);
    }

    // *text
    if starts && !ends {
        return name.ends_with(&pattern[1..]);
    }

    // text*
    if !starts && ends {
        return name.starts_with(&pattern[..pattern.len() - 1]);
    }

    if pattern.contains(WILDCARD) {
        return matches_segments(name, pattern);
    }

    name == pattern
}

/// Multi-wildcard case: first segment is a prefix, last a suffix, and the
/// interior segments must appear in order after the prefix.
fn matches_segments(name: &str, pattern: &str) -> bool {
    let parts: Vec<&str> = pattern.split(WILDCARD).collect();
    let mut cursor = 0;

    let first = parts[0];
    if !first.is_empty() {
        if !name.starts_with(first) {
            return false;
        }
        cursor = first.len();
    }

    let last = parts[parts.len() - 1];
    if !last.is_empty() && !name.ends_with(last) {
        return false;
    }

    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match name[cursor..].find(part) {
            Some(offset) => cursor += offset + part.len(),
            None => return false,
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_wildcard_matches_everything() {
        for name in ["", "a", "abc.txt", ".hidden", "no_ext"] {
            assert!(matches(name, "*"), "{name} should match *");
        }
    }

    #[test]
    fn test_exact_name() {
        assert!(matches("example", "example"));
        assert!(matches("Cargo.toml", "Cargo.toml"));
        assert!(!matches("example2", "example"));
    }

    #[test]
    fn test_suffix_and_prefix() {
        assert!(matches("abc.txt", "*.txt"));
        assert!(!matches("abc.md", "*.txt"));
        assert!(matches("example.rs", "exam*"));
        assert!(!matches("sample.rs", "exam*"));
    }

    #[test]
    fn test_contains() {
        assert!(matches("example.txt", "*amp*"));
        assert!(matches("sample", "*mple*"));
        assert!(!matches("other.txt", "*amp*"));
    }

    #[test]
    fn test_anchored_segments() {
        assert!(matches("foobar", "foo*bar"));
        assert!(matches("fooXbar", "foo*bar"));
        assert!(!matches("foobarX", "foo*bar"));
        assert!(matches("a_1_b_2_c", "a*1*2*c"));
        assert!(!matches("a_2_b_1_c", "a*1*2*c"));
    }

    #[test]
    fn test_double_wildcard_is_skipped() {
        assert!(matches("fooXYbar", "foo**bar"));
        assert!(matches("main.test.rs", "*.test**"));
    }

    #[test]
    fn test_interior_scan_starts_after_prefix() {
        // "ab" must be found after the "ab" prefix, not on top of it
        assert!(!matches("abz", "ab*ab*z"));
        assert!(matches("ab_ab_z", "ab*ab*z"));
    }

    #[test]
    fn test_trailing_wildcard_takes_precedence() {
        // Only the final `*` is a wildcard here, the inner one is literal
        assert!(matches("ab*ab.rs", "ab*ab*"));
        assert!(!matches("abcab", "ab*ab*"));
    }
}
