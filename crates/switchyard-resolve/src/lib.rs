//! Switchyard Resolve - companion repository branch resolution
//!
//! Decides which branch of a paired companion repository a joint test
//! run should check out: a manual override wins, then a companion branch
//! matching the current one, then the pull request's base branch, and
//! finally the shared default branch.

mod companion;
mod resolver;

pub use companion::LsRemoteCompanion;
pub use resolver::{resolve, CompanionRefs, Resolution, ResolutionRule, ResolveRequest};
