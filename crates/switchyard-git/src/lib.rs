//! Switchyard Git - Git operations for test orchestration
//!
//! This crate provides the read-only repository queries Switchyard needs:
//! opening a repository and computing changed-file deltas against a merge
//! base or a commit's first parent.

mod diff;
mod repository;

pub use repository::{GitRepo, Result};
