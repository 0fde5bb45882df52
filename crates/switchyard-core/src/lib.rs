//! Switchyard Core - Core library for cross-repository test orchestration
//!
//! This crate provides the foundational types, error handling, and
//! configuration for the Switchyard CI orchestration tool.

pub mod config;
pub mod error;
pub mod types;

pub use config::{load_config, load_config_or_default, Config, CONFIG_FILE_NAME};
pub use error::{ConfigError, GitError, RefError};
pub use types::{BranchRef, RefPresence, BRANCH_NAMESPACE};
