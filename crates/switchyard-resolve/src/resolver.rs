//! Companion branch decision logic

use serde::Serialize;
use tracing::{debug, info};

use switchyard_core::error::GitError;
use switchyard_core::types::{BranchRef, RefPresence};

/// Inputs for one companion branch resolution
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    /// Ref the triggering repository is currently on
    pub current: BranchRef,

    /// Pull request base ref, set only when a pull request triggered the run
    pub base: Option<BranchRef>,

    /// Manual override, trusted verbatim without an existence check
    pub override_ref: Option<BranchRef>,
}

/// Which priority step produced the resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionRule {
    /// A manual override was supplied
    ManualOverride,
    /// The current branch is the default branch
    OnDefaultBranch,
    /// The companion has a branch named like the current one
    MatchingBranch,
    /// The companion has the pull request's base branch
    BaseBranch,
    /// Nothing matched, fall back to the default branch
    DefaultFallback,
}

impl ResolutionRule {
    /// Returns a short human-readable description of the rule
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ManualOverride => "manual override",
            Self::OnDefaultBranch => "already on default branch",
            Self::MatchingBranch => "companion has matching branch",
            Self::BaseBranch => "companion has base branch",
            Self::DefaultFallback => "default fallback",
        }
    }
}

impl std::fmt::Display for ResolutionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved companion ref together with the rule that selected it
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Branch the companion checkout should use
    pub target: BranchRef,

    /// Priority step that decided it
    pub rule: ResolutionRule,
}

/// Read-only branch lookups against a companion repository.
///
/// Implementations must keep transport failures on the error side:
/// `RefPresence::Missing` asserts the companion was reachable and the
/// branch is genuinely absent.
pub trait CompanionRefs {
    /// Check whether the companion has a branch with this name
    fn has_branch(&self, branch: &BranchRef) -> Result<RefPresence, GitError>;
}

/// Resolve the companion branch for a joint test run.
///
/// Every path lands on the override, an existing companion branch, or
/// the default branch, so the result is always checkout-able (assuming
/// the override is). Lookup failures propagate instead of degrading to
/// the default, which could silently test the wrong code pairing.
pub fn resolve(
    companion: &dyn CompanionRefs,
    request: &ResolveRequest,
    default_branch: &BranchRef,
) -> Result<Resolution, GitError> {
    if let Some(override_ref) = &request.override_ref {
        info!(target = %override_ref, "companion ref overridden manually");
        return Ok(Resolution {
            target: override_ref.clone(),
            rule: ResolutionRule::ManualOverride,
        });
    }

    if request.current == *default_branch {
        debug!(branch = %request.current, "current branch is the default");
        return Ok(Resolution {
            target: default_branch.clone(),
            rule: ResolutionRule::OnDefaultBranch,
        });
    }

    if companion.has_branch(&request.current)?.is_found() {
        info!(branch = %request.current, "companion has a matching branch");
        return Ok(Resolution {
            target: request.current.clone(),
            rule: ResolutionRule::MatchingBranch,
        });
    }

    if let Some(base) = &request.base {
        if base != default_branch && companion.has_branch(base)?.is_found() {
            info!(branch = %base, "companion has the pull request base branch");
            return Ok(Resolution {
                target: base.clone(),
                rule: ResolutionRule::BaseBranch,
            });
        }
    }

    info!(branch = %default_branch, "no companion branch matched, using the default");
    Ok(Resolution {
        target: default_branch.clone(),
        rule: ResolutionRule::DefaultFallback,
    })
}
