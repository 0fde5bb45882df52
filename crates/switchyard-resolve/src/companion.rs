//! Companion lookups over the git transport

use git2::Direction;
use tracing::{debug, instrument};

use switchyard_core::error::GitError;
use switchyard_core::types::{BranchRef, RefPresence};

use crate::resolver::CompanionRefs;

/// Companion repository addressed by URL or local path.
///
/// Each lookup creates a detached remote, connects for fetch, and scans
/// the advertised refs, the same read-only query `git ls-remote` makes.
/// No clone and no credentials beyond what the transport itself needs.
pub struct LsRemoteCompanion {
    location: String,
}

impl LsRemoteCompanion {
    /// Create a lookup handle for a companion at this URL or path
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    /// The companion URL or path this handle queries
    pub fn location(&self) -> &str {
        &self.location
    }

    fn list_refs(&self) -> Result<Vec<String>, GitError> {
        let mut remote =
            git2::Remote::create_detached(self.location.as_str()).map_err(|e| self.unreachable(e))?;
        remote
            .connect(Direction::Fetch)
            .map_err(|e| self.unreachable(e))?;
        let refs = remote
            .list()
            .map_err(|e| self.unreachable(e))?
            .iter()
            .map(|head| head.name().to_string())
            .collect();
        Ok(refs)
    }

    fn unreachable(&self, e: git2::Error) -> GitError {
        GitError::CompanionUnreachable {
            location: self.location.clone(),
            reason: e.message().to_string(),
        }
    }
}

impl CompanionRefs for LsRemoteCompanion {
    #[instrument(skip(self), fields(companion = %self.location))]
    fn has_branch(&self, branch: &BranchRef) -> Result<RefPresence, GitError> {
        let refs = self.list_refs()?;
        let presence = if refs.iter().any(|r| r == branch.full_name()) {
            RefPresence::Found
        } else {
            RefPresence::Missing
        };
        debug!(
            branch = %branch,
            found = presence.is_found(),
            "companion branch lookup"
        );
        Ok(presence)
    }
}
