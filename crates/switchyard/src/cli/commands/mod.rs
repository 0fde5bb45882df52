//! CLI commands

mod assign_shard;
mod completions;
mod compute_selection;
mod merge_durations;
mod resolve_ref;

pub use assign_shard::AssignShardCommand;
pub use completions::CompletionsCommand;
pub use compute_selection::ComputeSelectionCommand;
pub use merge_durations::MergeDurationsCommand;
pub use resolve_ref::ResolveRefCommand;
