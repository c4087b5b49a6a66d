/*!
 * Exclusion rules for the structure listing and the code dump
 *
 * Rules come from the `StructureConfig` section of the configuration
 * document. The raw section is first coerced through the schema validator,
 * so any malformed or missing field simply becomes an empty rule set.
 */

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::pattern;
use crate::samples::{STRUCTURE_CONFIG_KEY, STRUCTURE_CONFIG_SCHEMA};
use crate::schema;
use crate::types::NodeKind;
use crate::utils::{base_name, dotted_extension, rule_key, segments, standard_path};

/// Section as it comes out of the validator: every leaf may be null
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStructureConfig {
    exclude_folders: Option<Vec<Option<String>>>,
    exclude_extensions: Option<Vec<Option<String>>>,
    exclude_files: Option<Vec<Option<String>>>,
    exclude_name: Option<Vec<Option<String>>>,
    exclude_code: Option<RawCodeRules>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCodeRules {
    folders: Option<Vec<Option<String>>>,
    extensions: Option<Vec<Option<String>>>,
    files: Option<Vec<Option<String>>>,
    name: Option<Vec<Option<String>>>,
}

/// Rules deciding which files contribute content to the code dump
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeRules {
    /// Folder names; any matching path segment excludes the file
    pub folders: Vec<String>,
    /// Extensions including the dot, e.g. `.lock`
    pub extensions: Vec<String>,
    /// Root-relative file paths
    pub files: Vec<String>,
    /// Wildcard patterns on the base name
    pub name: Vec<String>,
}

impl CodeRules {
    fn is_empty(&self) -> bool {
        self.folders.is_empty()
            && self.extensions.is_empty()
            && self.files.is_empty()
            && self.name.is_empty()
    }

    fn normalized(self) -> Self {
        Self {
            folders: normalize(self.folders),
            extensions: normalize(self.extensions),
            files: normalize(self.files),
            name: normalize(self.name),
        }
    }
}

/// Exclusion policy for one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureConfig {
    /// Root-relative folders left out of the listing, with their contents
    pub exclude_folders: Vec<String>,
    /// Extensions left out of the listing
    pub exclude_extensions: Vec<String>,
    /// Root-relative files left out of the listing
    pub exclude_files: Vec<String>,
    /// Wildcard patterns on file base names left out of the listing
    pub exclude_name: Vec<String>,
    /// Independent rules for the code dump
    pub exclude_code: CodeRules,
}

fn flatten(list: Option<Vec<Option<String>>>) -> Vec<String> {
    list.unwrap_or_default().into_iter().flatten().collect()
}

fn normalize(list: Vec<String>) -> Vec<String> {
    list.iter().map(|entry| standard_path(entry)).collect()
}

impl From<RawStructureConfig> for StructureConfig {
    fn from(raw: RawStructureConfig) -> Self {
        let code = raw.exclude_code.unwrap_or_default();
        Self {
            exclude_folders: flatten(raw.exclude_folders),
            exclude_extensions: flatten(raw.exclude_extensions),
            exclude_files: flatten(raw.exclude_files),
            exclude_name: flatten(raw.exclude_name),
            exclude_code: CodeRules {
                folders: flatten(code.folders),
                extensions: flatten(code.extensions),
                files: flatten(code.files),
                name: flatten(code.name),
            },
        }
    }
}

impl StructureConfig {
    /// Build the policy from a parsed configuration document
    ///
    /// Never fails: anything that does not fit the expected shape is
    /// dropped. A warning is logged when no rule survives.
    pub fn from_document(document: &Value) -> Self {
        let section = document.get(STRUCTURE_CONFIG_KEY).unwrap_or(&Value::Null);
        let coerced = schema::validate(section, &STRUCTURE_CONFIG_SCHEMA);

        let raw: RawStructureConfig = serde_json::from_value(coerced).unwrap_or_else(|e| {
            log::warn!("Discarding structure configuration: {}", e);
            RawStructureConfig::default()
        });

        let config = Self::from(raw).normalized();
        if config.is_empty() {
            log::warn!("Configuration section '{}' is invalid or empty", STRUCTURE_CONFIG_KEY);
        }
        config
    }

    /// Apply the canonical path form to every entry
    pub fn normalized(self) -> Self {
        Self {
            exclude_folders: normalize(self.exclude_folders),
            exclude_extensions: normalize(self.exclude_extensions),
            exclude_files: normalize(self.exclude_files),
            exclude_name: normalize(self.exclude_name),
            exclude_code: self.exclude_code.normalized(),
        }
    }

    /// True when no rule of any kind is configured
    pub fn is_empty(&self) -> bool {
        self.exclude_folders.is_empty()
            && self.exclude_extensions.is_empty()
            && self.exclude_files.is_empty()
            && self.exclude_name.is_empty()
            && self.exclude_code.is_empty()
    }
}

/// Evaluates entries under `root` against a [`StructureConfig`]
#[derive(Debug, Clone, Copy)]
pub struct ExclusionPolicy<'a> {
    root: &'a Path,
    config: &'a StructureConfig,
}

impl<'a> ExclusionPolicy<'a> {
    pub fn new(root: &'a Path, config: &'a StructureConfig) -> Self {
        Self { root, config }
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(self.root).unwrap_or(path)
    }

    /// Whether `path` is left out of the structure listing
    ///
    /// Directories only match `exclude_folders` exactly. Files without a
    /// dot in their base name are never excluded.
    pub fn excluded_from_structure(&self, path: &Path, kind: NodeKind) -> bool {
        let relative = rule_key(self.relative(path));

        if kind == NodeKind::Directory {
            return self.config.exclude_folders.contains(&relative);
        }

        let name = base_name(path);
        if !name.contains('.') {
            return false;
        }

        self.config.exclude_files.contains(&relative)
            || self
                .config
                .exclude_extensions
                .contains(&dotted_extension(path))
            || self
                .config
                .exclude_name
                .iter()
                .any(|p| pattern::matches(&name, p))
    }

    /// Whether the content of `path` is left out of the code dump
    ///
    /// Directories are always excluded. The folder rule is checked against
    /// every segment of the relative path before the no-dot shortcut.
    pub fn excluded_from_code(&self, path: &Path, kind: NodeKind) -> bool {
        if kind == NodeKind::Directory {
            return true;
        }

        let rules = &self.config.exclude_code;
        let relative = self.relative(path);

        if segments(relative)
            .iter()
            .any(|segment| rules.folders.contains(segment))
        {
            return true;
        }

        let name = base_name(path);
        if !name.contains('.') {
            return false;
        }

        rules.extensions.contains(&dotted_extension(path))
            || rules.files.contains(&rule_key(relative))
            || rules.name.iter().any(|p| pattern::matches(&name, p))
    }
}
