//! CLI definition and command handling

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use commands::{
    AssignShardCommand, CompletionsCommand, ComputeSelectionCommand, MergeDurationsCommand,
    ResolveRefCommand,
};

/// Switchyard - Cross-repository CI test orchestration CLI
#[derive(Debug, Parser)]
#[command(name = "switchyard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve which companion repository branch this run should check out
    ResolveRef(ResolveRefCommand),

    /// Compute the set of tests worth running for a change
    ComputeSelection(ComputeSelectionCommand),

    /// Slice a selection into this worker's shard
    AssignShard(AssignShardCommand),

    /// Fold measured test durations into the history store
    MergeDurations(MergeDurationsCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::ResolveRef(ref cmd) => cmd.execute(&self),
            Commands::ComputeSelection(ref cmd) => cmd.execute(&self),
            Commands::AssignShard(ref cmd) => cmd.execute(&self),
            Commands::MergeDurations(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }
}
