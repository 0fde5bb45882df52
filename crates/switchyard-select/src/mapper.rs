//! Changed-file to test mapping

use std::collections::BTreeSet;
use std::path::Path;

use globset::GlobSet;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use switchyard_core::config::{MappingRule, SelectionConfig};

use crate::discovery::{compile_globs, DiscoveryError};

/// Errors while compiling the mapper from configuration
#[derive(Debug, Error)]
pub enum MapperError {
    /// A glob list did not compile
    #[error(transparent)]
    Glob(#[from] DiscoveryError),

    /// A mapping rule pattern did not compile
    #[error("Invalid mapping rule pattern '{pattern}': {source}")]
    BadRule {
        pattern: String,
        source: regex::Error,
    },
}

/// How a single changed file maps into the selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappedChange {
    /// Contributes nothing (ignored paths, deleted test files)
    Ignored,

    /// The changed file is itself a discovered test file
    TestFile(String),

    /// Mapped to explicit test targets
    Targets(Vec<String>),

    /// A critical path changed, the whole suite must run
    FullSuite,

    /// No rule or heuristic matched
    Unmapped,
}

struct CompiledRule {
    pattern: Regex,
    tests: Vec<String>,
}

/// Maps changed source files to the tests that cover them
pub struct ChangeMapper {
    ignore: GlobSet,
    full_suite: GlobSet,
    tests: GlobSet,
    rules: Vec<CompiledRule>,
}

impl ChangeMapper {
    /// Compile a mapper from selection configuration
    pub fn from_config(config: &SelectionConfig) -> Result<Self, MapperError> {
        let rules = config
            .rules
            .iter()
            .map(compile_rule)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            ignore: compile_globs(&config.ignore_globs)?,
            full_suite: compile_globs(&config.full_suite_globs)?,
            tests: compile_globs(&config.test_globs)?,
            rules,
        })
    }

    /// Map one changed file against the discovered suite
    pub fn map(&self, path: &str, suite: &BTreeSet<String>) -> MappedChange {
        if self.ignore.is_match(path) {
            return MappedChange::Ignored;
        }

        if self.full_suite.is_match(path) {
            return MappedChange::FullSuite;
        }

        if self.tests.is_match(path) {
            // A deleted test file has nothing left to run
            if suite.contains(path) {
                return MappedChange::TestFile(path.to_string());
            }
            debug!(path, "changed test file no longer exists");
            return MappedChange::Ignored;
        }

        for rule in &self.rules {
            if let Some(caps) = rule.pattern.captures(path) {
                let mut targets = Vec::new();
                for template in &rule.tests {
                    let mut expanded = String::new();
                    caps.expand(template, &mut expanded);
                    targets.extend(expand_target(&expanded, suite));
                }
                return MappedChange::Targets(targets);
            }
        }

        let matches = stem_matches(path, suite);
        if !matches.is_empty() {
            return MappedChange::Targets(matches);
        }

        MappedChange::Unmapped
    }
}

fn compile_rule(rule: &MappingRule) -> Result<CompiledRule, MapperError> {
    let pattern = Regex::new(&rule.pattern).map_err(|e| MapperError::BadRule {
        pattern: rule.pattern.clone(),
        source: e,
    })?;
    Ok(CompiledRule {
        pattern,
        tests: rule.tests.clone(),
    })
}

/// Expand a rule target against the discovered suite.
///
/// An exact suite member selects itself. A directory prefix selects
/// every discovered test under it. Anything else is kept verbatim so
/// the runner can still reject it loudly.
fn expand_target(target: &str, suite: &BTreeSet<String>) -> Vec<String> {
    if suite.contains(target) {
        return vec![target.to_string()];
    }

    let trimmed = target.trim_end_matches('/');
    let prefix = format!("{}/", trimmed);
    let under: Vec<String> = suite
        .iter()
        .filter(|test| test.starts_with(&prefix))
        .cloned()
        .collect();
    if under.is_empty() {
        vec![trimmed.to_string()]
    } else {
        under
    }
}

/// Module-to-test heuristic: a source stem `s` selects discovered tests
/// whose stem is `test_s` or `s_test`
fn stem_matches(path: &str, suite: &BTreeSet<String>) -> Vec<String> {
    let stem = match Path::new(path).file_stem().and_then(|s| s.to_str()) {
        Some(s) if !s.is_empty() => s,
        _ => return Vec::new(),
    };
    let prefixed = format!("test_{}", stem);
    let suffixed = format!("{}_test", stem);

    suite
        .iter()
        .filter(|test| {
            match Path::new(test).file_stem().and_then(|s| s.to_str()) {
                Some(test_stem) => test_stem == prefixed || test_stem == suffixed,
                None => false,
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suite(paths: &[&str]) -> BTreeSet<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    fn mapper_with_rules(rules: Vec<MappingRule>) -> ChangeMapper {
        let config = SelectionConfig {
            test_globs: vec!["tests/**/test_*.py".to_string()],
            ignore_globs: vec!["**/*.md".to_string(), "docs/**".to_string()],
            full_suite_globs: vec!["setup.cfg".to_string(), ".ci/**".to_string()],
            rules,
        };
        ChangeMapper::from_config(&config).unwrap()
    }

    #[test]
    fn test_ignored_paths() {
        let mapper = mapper_with_rules(vec![]);
        let suite = suite(&["tests/unit/test_api.py"]);
        assert_eq!(mapper.map("README.md", &suite), MappedChange::Ignored);
        assert_eq!(mapper.map("docs/guide/index.html", &suite), MappedChange::Ignored);
    }

    #[test]
    fn test_critical_path_forces_full_suite() {
        let mapper = mapper_with_rules(vec![]);
        let suite = suite(&["tests/unit/test_api.py"]);
        assert_eq!(mapper.map("setup.cfg", &suite), MappedChange::FullSuite);
        assert_eq!(mapper.map(".ci/build.yml", &suite), MappedChange::FullSuite);
    }

    #[test]
    fn test_changed_test_selects_itself() {
        let mapper = mapper_with_rules(vec![]);
        let suite = suite(&["tests/unit/test_api.py"]);
        assert_eq!(
            mapper.map("tests/unit/test_api.py", &suite),
            MappedChange::TestFile("tests/unit/test_api.py".to_string())
        );
    }

    #[test]
    fn test_deleted_test_selects_nothing() {
        let mapper = mapper_with_rules(vec![]);
        let suite = suite(&["tests/unit/test_api.py"]);
        assert_eq!(
            mapper.map("tests/unit/test_gone.py", &suite),
            MappedChange::Ignored
        );
    }

    #[test]
    fn test_rule_with_capture_expansion() {
        let mapper = mapper_with_rules(vec![MappingRule {
            pattern: r"^src/services/(?P<svc>[^/]+)/".to_string(),
            tests: vec!["tests/services/$svc".to_string()],
        }]);
        let suite = suite(&[
            "tests/services/s3/test_bucket.py",
            "tests/services/s3/test_object.py",
            "tests/services/sqs/test_queue.py",
        ]);

        let mapped = mapper.map("src/services/s3/models.py", &suite);
        assert_eq!(
            mapped,
            MappedChange::Targets(vec![
                "tests/services/s3/test_bucket.py".to_string(),
                "tests/services/s3/test_object.py".to_string(),
            ])
        );
    }

    #[test]
    fn test_rule_target_kept_verbatim_when_not_discovered() {
        let mapper = mapper_with_rules(vec![MappingRule {
            pattern: r"^src/auth/".to_string(),
            tests: vec!["tests/auth".to_string()],
        }]);
        let suite = suite(&["tests/unit/test_api.py"]);

        let mapped = mapper.map("src/auth/token.py", &suite);
        assert_eq!(
            mapped,
            MappedChange::Targets(vec!["tests/auth".to_string()])
        );
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mapper = mapper_with_rules(vec![
            MappingRule {
                pattern: r"^src/core/".to_string(),
                tests: vec!["tests/unit/test_core.py".to_string()],
            },
            MappingRule {
                pattern: r"^src/".to_string(),
                tests: vec!["tests/unit/test_everything.py".to_string()],
            },
        ]);
        let suite = suite(&["tests/unit/test_core.py", "tests/unit/test_everything.py"]);

        let mapped = mapper.map("src/core/engine.py", &suite);
        assert_eq!(
            mapped,
            MappedChange::Targets(vec!["tests/unit/test_core.py".to_string()])
        );
    }

    #[test]
    fn test_stem_heuristic() {
        let mapper = mapper_with_rules(vec![]);
        let suite = suite(&["tests/unit/test_store.py", "tests/unit/test_api.py"]);

        let mapped = mapper.map("src/store.py", &suite);
        assert_eq!(
            mapped,
            MappedChange::Targets(vec!["tests/unit/test_store.py".to_string()])
        );
    }

    #[test]
    fn test_unmapped_change() {
        let mapper = mapper_with_rules(vec![]);
        let suite = suite(&["tests/unit/test_api.py"]);
        assert_eq!(mapper.map("src/mystery.py", &suite), MappedChange::Unmapped);
    }

    #[test]
    fn test_bad_rule_pattern_is_an_error() {
        let config = SelectionConfig {
            rules: vec![MappingRule {
                pattern: "(unclosed".to_string(),
                tests: vec![],
            }],
            ..Default::default()
        };
        let result = ChangeMapper::from_config(&config);
        assert!(matches!(result, Err(MapperError::BadRule { .. })));
    }
}
