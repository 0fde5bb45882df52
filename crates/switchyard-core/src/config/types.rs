//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for Switchyard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Companion repository configuration
    pub companion: CompanionConfig,

    /// Test selection configuration
    pub selection: SelectionConfig,

    /// Duration history configuration
    pub durations: DurationsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            companion: CompanionConfig::default(),
            selection: SelectionConfig::default(),
            durations: DurationsConfig::default(),
        }
    }
}

/// Companion repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionConfig {
    /// URL or local path of the paired repository
    pub remote: Option<String>,

    /// Default branch both repositories converge on
    pub default_branch: String,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            remote: None,
            default_branch: "main".to_string(),
        }
    }
}

/// Test selection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Globs identifying test files within the repository
    pub test_globs: Vec<String>,

    /// Changed files matching these contribute nothing to the selection
    pub ignore_globs: Vec<String>,

    /// Changed files matching these force the full suite
    pub full_suite_globs: Vec<String>,

    /// Ordered source-to-test mapping rules, first match wins
    #[serde(default)]
    pub rules: Vec<MappingRule>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            test_globs: vec![
                "tests/**/test_*.py".to_string(),
                "tests/**/*_test.py".to_string(),
            ],
            ignore_globs: vec![
                "**/*.md".to_string(),
                "docs/**".to_string(),
                "LICENSE*".to_string(),
            ],
            full_suite_globs: Vec::new(),
            rules: Vec::new(),
        }
    }
}

/// A regex mapping from changed source paths to test targets.
///
/// Named captures from the pattern can be referenced in the targets,
/// e.g. pattern `^src/services/(?P<svc>[^/]+)/` with target
/// `tests/services/$svc`. A target that names a directory expands to
/// every discovered test underneath it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingRule {
    /// Regex matched against the changed file path
    pub pattern: String,

    /// Test files or directories selected when the pattern matches
    pub tests: Vec<String>,
}

/// Duration history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationsConfig {
    /// Explicit store path, overriding the fingerprint-derived default
    pub path: Option<PathBuf>,

    /// Shard group name folded into the environment fingerprint
    pub group: String,
}

impl Default for DurationsConfig {
    fn default() -> Self {
        Self {
            path: None,
            group: "default".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.companion.default_branch, "main");
        assert!(config.companion.remote.is_none());
        assert!(!config.selection.test_globs.is_empty());
        assert!(config.selection.rules.is_empty());
        assert_eq!(config.durations.group, "default");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[companion]
remote = "https://example.com/acme/widgets-pro.git"
default_branch = "master"

[selection]
test_globs = ["tests/**/test_*.py"]
ignore_globs = ["**/*.rst"]
full_suite_globs = ["setup.cfg", ".ci/**"]

[[selection.rules]]
pattern = '^src/services/(?P<svc>[^/]+)/'
tests = ["tests/services/$svc"]

[durations]
group = "amd64"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.companion.default_branch, "master");
        assert_eq!(
            config.companion.remote.as_deref(),
            Some("https://example.com/acme/widgets-pro.git")
        );
        assert_eq!(config.selection.full_suite_globs.len(), 2);
        assert_eq!(config.selection.rules.len(), 1);
        assert_eq!(config.selection.rules[0].tests, vec!["tests/services/$svc"]);
        assert_eq!(config.durations.group, "amd64");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let toml = "[companion]\ndefault_branch = \"trunk\"\n";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.companion.default_branch, "trunk");
        assert!(!config.selection.ignore_globs.is_empty());
        assert_eq!(config.durations.group, "default");
    }
}
