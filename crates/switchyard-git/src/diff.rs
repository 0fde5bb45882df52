//! Changed-file queries against commit history

use std::collections::BTreeSet;

use tracing::debug;

use switchyard_core::error::GitError;

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Find the merge base of two revisions, returned as a commit SHA
    pub fn merge_base(&self, ours: &str, theirs: &str) -> Result<String> {
        let our_commit = self.rev_to_commit(ours)?;
        let their_commit = self.rev_to_commit(theirs)?;

        let base = self
            .repo
            .merge_base(our_commit.id(), their_commit.id())
            .map_err(|_| GitError::NoMergeBase {
                ours: ours.to_string(),
                theirs: theirs.to_string(),
            })?;

        Ok(base.to_string())
    }

    /// Paths changed between two revisions (old to new)
    pub fn changed_files(&self, from: &str, to: &str) -> Result<Vec<String>> {
        let old = self.rev_to_commit(from)?;
        let new = self.rev_to_commit(to)?;
        self.diff_commits(&old, &new)
    }

    /// Paths changed on a pull request branch, measured from the merge
    /// base with its target so changes landed on the target in the
    /// meantime do not leak into the delta.
    pub fn changed_since_merge_base(&self, base: &str, head: &str) -> Result<Vec<String>> {
        let ancestor = self.merge_base(base, head)?;
        self.changed_files(&ancestor, head)
    }

    /// Paths changed by the HEAD commit relative to its first parent
    pub fn head_delta(&self) -> Result<Vec<String>> {
        let head = self.head_commit()?;
        let parent = head
            .parent(0)
            .map_err(|_| GitError::NoParent(head.id().to_string()))?;
        let paths = self.diff_commits(&parent, &head)?;
        Ok(paths)
    }

    fn diff_commits(&self, old: &git2::Commit<'_>, new: &git2::Commit<'_>) -> Result<Vec<String>> {
        let old_tree = old.tree().map_err(GitError::Git2)?;
        let new_tree = new.tree().map_err(GitError::Git2)?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)
            .map_err(GitError::Git2)?;

        // Collect both sides of each delta so renames and deletions
        // surface under their old path as well.
        let mut paths = BTreeSet::new();
        for delta in diff.deltas() {
            if let Some(path) = delta.old_file().path() {
                paths.insert(path.to_string_lossy().into_owned());
            }
            if let Some(path) = delta.new_file().path() {
                paths.insert(path.to_string_lossy().into_owned());
            }
        }

        debug!(old = %old.id(), new = %new.id(), count = paths.len(), "computed changed files");
        Ok(paths.into_iter().collect())
    }
}
