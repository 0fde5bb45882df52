//! Exit codes for the CLI

#![allow(dead_code)]

/// Success
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Invalid arguments or inputs, matching clap's own usage-error code
pub const USAGE_ERROR: i32 = 2;

/// Configuration error
pub const CONFIG_ERROR: i32 = 3;

/// Git or companion repository error
pub const GIT_ERROR: i32 = 4;
