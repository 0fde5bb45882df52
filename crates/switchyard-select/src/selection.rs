//! Selection computation and the selection artifact

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, info, warn};

use switchyard_core::config::SelectionConfig;
use switchyard_git::GitRepo;

use crate::discovery::discover_suite;
use crate::mapper::{ChangeMapper, MappedChange};

/// Artifact line that means "no filter, run the full suite"
pub const FULL_SUITE_SENTINEL: &str = "SENTINEL_ALL_TESTS";

/// Why a computation ended in the full suite
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionReason {
    /// The changed-file delta could not be computed
    DiffUnavailable(String),
    /// A critical path (build system, CI config, dependencies) changed
    CriticalPath(String),
    /// A changed file could not be mapped to any tests
    UnmappedChange(String),
    /// The mapper or suite discovery could not be built
    SelectionUnavailable(String),
    /// A selection artifact carried the sentinel
    SentinelArtifact,
}

impl std::fmt::Display for SelectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DiffUnavailable(detail) => write!(f, "changed files unavailable: {}", detail),
            Self::CriticalPath(path) => write!(f, "critical path changed: {}", path),
            Self::UnmappedChange(path) => write!(f, "unmappable change: {}", path),
            Self::SelectionUnavailable(detail) => {
                write!(f, "selection unavailable: {}", detail)
            }
            Self::SentinelArtifact => write!(f, "artifact requested the full suite"),
        }
    }
}

/// Result of a selection computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Concrete set of test file paths to run
    Subset(BTreeSet<String>),
    /// Run everything, with the reason recorded
    FullSuite(SelectionReason),
}

impl Selection {
    /// Returns true when the whole suite must run
    pub fn is_full_suite(&self) -> bool {
        matches!(self, Self::FullSuite(_))
    }
}

/// What kind of pipeline event drove this run
#[derive(Debug, Clone)]
pub enum Trigger {
    /// Direct push: compare HEAD against its first parent
    Push,
    /// Pull request: compare head against the merge base with base
    PullRequest { base_sha: String, head_sha: String },
}

/// Compute the test selection for a repository and trigger.
///
/// Infallible on purpose. Every failure mode (no repository, no parent,
/// no merge base, broken configuration) degrades to the full-suite
/// sentinel, so an error can cost machine time but never skip tests.
pub fn compute_selection(repo_path: &Path, config: &SelectionConfig, trigger: &Trigger) -> Selection {
    let repo = match GitRepo::discover(repo_path) {
        Ok(repo) => repo,
        Err(e) => {
            warn!(error = %e, "repository unavailable, selecting the full suite");
            return Selection::FullSuite(SelectionReason::DiffUnavailable(e.to_string()));
        }
    };

    let changed = match trigger {
        Trigger::Push => repo.head_delta(),
        Trigger::PullRequest { base_sha, head_sha } => {
            repo.changed_since_merge_base(base_sha, head_sha)
        }
    };
    let changed = match changed {
        Ok(changed) => changed,
        Err(e) => {
            warn!(error = %e, "changed files unavailable, selecting the full suite");
            return Selection::FullSuite(SelectionReason::DiffUnavailable(e.to_string()));
        }
    };

    let root = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();
    select_for_changes(&root, config, &changed)
}

/// Map an already-computed changed-file list to a selection
pub fn select_for_changes(root: &Path, config: &SelectionConfig, changed: &[String]) -> Selection {
    let suite = match discover_suite(root, &config.test_globs) {
        Ok(suite) => suite,
        Err(e) => {
            warn!(error = %e, "suite discovery failed, selecting the full suite");
            return Selection::FullSuite(SelectionReason::SelectionUnavailable(e.to_string()));
        }
    };

    let mapper = match ChangeMapper::from_config(config) {
        Ok(mapper) => mapper,
        Err(e) => {
            warn!(error = %e, "selection config invalid, selecting the full suite");
            return Selection::FullSuite(SelectionReason::SelectionUnavailable(e.to_string()));
        }
    };

    let mut selected = BTreeSet::new();
    for path in changed {
        match mapper.map(path, &suite) {
            MappedChange::Ignored => {
                debug!(path = %path, "change contributes no tests");
            }
            MappedChange::TestFile(test) => {
                selected.insert(test);
            }
            MappedChange::Targets(tests) => {
                selected.extend(tests);
            }
            MappedChange::FullSuite => {
                info!(path = %path, "critical path changed, selecting the full suite");
                return Selection::FullSuite(SelectionReason::CriticalPath(path.clone()));
            }
            MappedChange::Unmapped => {
                info!(path = %path, "change not mappable to tests, selecting the full suite");
                return Selection::FullSuite(SelectionReason::UnmappedChange(path.clone()));
            }
        }
    }

    info!(changed = changed.len(), selected = selected.len(), "test selection computed");
    Selection::Subset(selected)
}

/// Write a selection artifact: sorted test paths, or the sentinel line
pub fn write_selection(path: &Path, selection: &Selection) -> std::io::Result<()> {
    let mut contents = String::new();
    match selection {
        Selection::FullSuite(_) => {
            contents.push_str(FULL_SUITE_SENTINEL);
            contents.push('\n');
        }
        Selection::Subset(tests) => {
            for test in tests {
                contents.push_str(test);
                contents.push('\n');
            }
        }
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)
}

/// Read a selection artifact written by [`write_selection`].
///
/// A sentinel anywhere in the file means the full suite; blank lines
/// are skipped.
pub fn read_selection(path: &Path) -> std::io::Result<Selection> {
    let contents = std::fs::read_to_string(path)?;

    let mut tests = BTreeSet::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == FULL_SUITE_SENTINEL {
            return Ok(Selection::FullSuite(SelectionReason::SentinelArtifact));
        }
        tests.insert(line.to_string());
    }
    Ok(Selection::Subset(tests))
}
