//! Configuration system for Switchyard

mod loader;
mod types;

pub use loader::*;
pub use types::*;
