//! Configuration loading from deadsnip.toml.

use std::{fs, path::Path};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{DeadsnipError, DeadsnipResult, IoResultExt};

/// Name of the optional config file at the project root.
pub const CONFIG_FILE: &str = "deadsnip.toml";

/// Main configuration structure for deadsnip.toml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeadsnipConfig {
    /// Manifest path, relative to the project root.
    pub manifest: Option<String>,
    /// Globs promoting files to entrypoints.
    pub entrypoints: Option<Vec<String>>,
    /// Globs restricting which files may be edited or deleted.
    pub sources: Option<Vec<String>>,
    /// Name or filename patterns whose dead declarations are not reported.
    pub ignore: Option<Vec<String>>,
    pub follow_grep_references: Option<bool>,
    pub preserve_line_numbers: Option<bool>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output format configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

impl OutputConfig {
    pub fn is_json(&self) -> bool {
        self.format.as_deref() == Some("json")
    }
}

/// Loads configuration from deadsnip.toml if it exists.
pub fn load_config(root: &Path) -> DeadsnipResult<Option<DeadsnipConfig>> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).with_path(&path)?;
    parse_config(&content, &path).map(Some)
}

/// Parse config text; `path` is only used in error messages.
pub fn parse_config(content: &str, path: &Path) -> DeadsnipResult<DeadsnipConfig> {
    let cfg: DeadsnipConfig = toml::from_str(content)
        .map_err(|e| DeadsnipError::config(path, format!("invalid {}: {}", CONFIG_FILE, e)))?;

    if let Some(format) = cfg.output.as_ref().and_then(|o| o.format.as_deref()) {
        if format != "plain" && format != "json" {
            return Err(DeadsnipError::config(
                path,
                format!("unknown output format `{}` (expected plain or json)", format),
            ));
        }
    }
    Ok(cfg)
}

/// Compiled set of filename globs.
#[derive(Debug, Clone)]
pub struct GlobList {
    set: GlobSet,
    len: usize,
}

impl GlobList {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> DeadsnipResult<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern)
                .map_err(|e| DeadsnipError::pattern(pattern, e.to_string()))?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| DeadsnipError::pattern(patterns_display(patterns), e.to_string()))?;
        Ok(Self {
            set,
            len: patterns.len(),
        })
    }

    pub fn empty() -> Self {
        Self {
            set: GlobSet::empty(),
            len: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if any glob matches. An empty list matches nothing.
    pub fn is_match(&self, filename: &str) -> bool {
        self.set.is_match(filename)
    }

    /// True if any glob matches, or if the list is empty.
    pub fn allows(&self, filename: &str) -> bool {
        self.is_empty() || self.set.is_match(filename)
    }
}

impl Default for GlobList {
    fn default() -> Self {
        Self::empty()
    }
}

/// Name patterns for dead declarations that should be kept and not reported.
///
/// `prefix*` matches a prefix, `*suffix` a suffix, anything else a substring.
#[derive(Debug, Clone, Default)]
pub struct IgnorePatterns {
    patterns: Vec<String>,
}

impl IgnorePatterns {
    pub fn new(patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check if a name matches any pattern.
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|pattern| {
            if let Some(prefix) = pattern.strip_suffix('*') {
                name.starts_with(prefix)
            } else if let Some(suffix) = pattern.strip_prefix('*') {
                name.ends_with(suffix)
            } else {
                name.contains(pattern.as_str())
            }
        })
    }
}

fn patterns_display<S: AsRef<str>>(patterns: &[S]) -> String {
    patterns
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
manifest = "graph.json"
entrypoints = ["src/index_*"]
sources = ["src/**/*.ts"]
ignore = ["generated"]
follow_grep_references = true
preserve_line_numbers = false

[output]
format = "json"
"#;
        let cfg = parse_config(toml, Path::new("deadsnip.toml")).unwrap();
        assert_eq!(cfg.manifest.as_deref(), Some("graph.json"));
        assert_eq!(cfg.entrypoints.unwrap(), vec!["src/index_*"]);
        assert_eq!(cfg.follow_grep_references, Some(true));
        assert!(cfg.output.unwrap().is_json());
    }

    #[test]
    fn test_parse_empty_config() {
        let cfg = parse_config("", Path::new("deadsnip.toml")).unwrap();
        assert!(cfg.manifest.is_none());
        assert!(cfg.ignore.is_none());
    }

    #[test]
    fn test_unknown_output_format_rejected() {
        let err = parse_config("[output]\nformat = \"xml\"\n", Path::new("deadsnip.toml")).unwrap_err();
        assert!(matches!(err, DeadsnipError::Config { .. }));
        assert!(err.to_string().contains("xml"));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let err = parse_config("manifest = [", Path::new("x/deadsnip.toml")).unwrap_err();
        assert_eq!(err.path().unwrap(), Path::new("x/deadsnip.toml"));
    }

    #[test]
    fn test_load_config_missing_is_none() {
        let dir = std::env::temp_dir().join("deadsnip_config_missing_test");
        fs::create_dir_all(&dir).unwrap();
        fs::remove_file(dir.join(CONFIG_FILE)).ok();
        assert!(load_config(&dir).unwrap().is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_glob_list_matching() {
        let globs = GlobList::new(&["src/**/*.ts", "lib/*.js"]).unwrap();
        assert!(globs.is_match("src/a/b.ts"));
        assert!(globs.is_match("lib/x.js"));
        assert!(!globs.is_match("test/x.ts"));
        assert!(!globs.is_empty());
    }

    #[test]
    fn test_empty_glob_list() {
        let globs = GlobList::empty();
        assert!(!globs.is_match("anything.ts"));
        assert!(globs.allows("anything.ts"));
    }

    #[test]
    fn test_ignore_patterns() {
        let ignore = IgnorePatterns::new(["test_*", "*_gen", "legacy"]);
        assert!(ignore.matches("test_helper"));
        assert!(ignore.matches("schema_gen"));
        assert!(ignore.matches("src/legacy/a.ts"));
        assert!(!ignore.matches("helper_test"));
        assert!(!IgnorePatterns::default().matches("anything"));
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let err = GlobList::new(&["src/[.ts"]).unwrap_err();
        assert!(matches!(err, DeadsnipError::Pattern { .. }));
    }
}
