//! Test suite discovery

use std::collections::BTreeSet;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Errors while discovering the test suite
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A configured glob does not compile
    #[error("Invalid glob '{pattern}': {source}")]
    BadGlob {
        pattern: String,
        source: globset::Error,
    },

    /// The glob set could not be built
    #[error("Failed to build glob set: {0}")]
    Build(globset::Error),

    /// The working tree could not be walked
    #[error("Failed to walk working tree: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Compile a list of glob patterns into a single match set
pub(crate) fn compile_globs(patterns: &[String]) -> Result<GlobSet, DiscoveryError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| DiscoveryError::BadGlob {
            pattern: pattern.clone(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(DiscoveryError::Build)
}

/// Discover the full test suite under a repository working tree.
///
/// Walks the tree (skipping `.git`), keeps files matching the test
/// globs, and returns sorted forward-slash paths relative to the root.
pub fn discover_suite(root: &Path, test_globs: &[String]) -> Result<BTreeSet<String>, DiscoveryError> {
    let matcher = compile_globs(test_globs)?;

    let mut suite = BTreeSet::new();
    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git");
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let relative = relative.to_string_lossy().replace('\\', "/");
        if matcher.is_match(&relative) {
            suite.insert(relative);
        }
    }

    debug!(root = %root.display(), count = suite.len(), "test suite discovered");
    Ok(suite)
}
