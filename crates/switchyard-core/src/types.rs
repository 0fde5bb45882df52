//! Core types for Switchyard

use serde::Serialize;

use crate::error::RefError;

/// Namespace prefix for branch refs
pub const BRANCH_NAMESPACE: &str = "refs/heads/";

/// A branch reference, stored in the full `refs/heads/<name>` form.
///
/// Accepts both short branch names (`feature-x`) and fully qualified refs
/// (`refs/heads/feature-x`), so values can come straight from CI
/// environment variables. Refs in other namespaces are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BranchRef(String);

impl BranchRef {
    /// Parse a short branch name or a full branch ref
    pub fn parse(input: &str) -> Result<Self, RefError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(RefError::Empty);
        }

        if let Some(name) = trimmed.strip_prefix(BRANCH_NAMESPACE) {
            if name.is_empty() {
                return Err(RefError::Empty);
            }
            return Ok(Self(trimmed.to_string()));
        }

        if trimmed.starts_with("refs/") {
            return Err(RefError::NotABranch(trimmed.to_string()));
        }

        Ok(Self(format!("{}{}", BRANCH_NAMESPACE, trimmed)))
    }

    /// Full ref name including the `refs/heads/` namespace
    pub fn full_name(&self) -> &str {
        &self.0
    }

    /// Short branch name without the namespace
    pub fn branch_name(&self) -> &str {
        &self.0[BRANCH_NAMESPACE.len()..]
    }
}

impl std::fmt::Display for BranchRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.branch_name())
    }
}

impl std::str::FromStr for BranchRef {
    type Err = RefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Outcome of a successful companion branch lookup.
///
/// Lookup failures travel on the error side of the result, keeping
/// "the branch is not there" distinct from "we could not ask".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefPresence {
    /// The companion advertises a branch with this name
    Found,
    /// The query succeeded and no such branch exists
    Missing,
}

impl RefPresence {
    /// Returns true if the branch exists on the companion
    pub fn is_found(self) -> bool {
        matches!(self, Self::Found)
    }
}
