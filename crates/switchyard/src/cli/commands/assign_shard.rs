//! Assign-shard command

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{info, warn};

use switchyard_core::config::{load_config_or_default, Config};
use switchyard_git::GitRepo;
use switchyard_select::{
    discover_suite, read_selection, DurationStore, Fingerprint, Selection, SelectionReason,
    ShardPlan,
};

use crate::cli::{Cli, OutputFormat};

/// Slice a selection into this worker's shard
#[derive(Debug, Args)]
pub struct AssignShardCommand {
    /// Selection artifact produced by compute-selection
    #[arg(long, default_value = ".switchyard/selection.txt")]
    pub selection: PathBuf,

    /// Total number of shards
    #[arg(long, env = "SWITCHYARD_SHARDS")]
    pub shards: usize,

    /// This worker's 1-based shard index
    #[arg(long, env = "SWITCHYARD_SHARD_INDEX")]
    pub index: usize,

    /// Duration store path (defaults to the fingerprint-derived store)
    #[arg(long)]
    pub durations: Option<PathBuf>,

    /// Repository the suite and store belong to
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,
}

impl AssignShardCommand {
    /// Execute the assign-shard command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(shards = self.shards, index = self.index, "executing assign-shard command");
        let root = config_root(&self.repo);
        let (config, _) = load_config_or_default(&root);

        let selection = match read_selection(&self.selection) {
            Ok(selection) => selection,
            Err(e) => {
                warn!(
                    path = %self.selection.display(),
                    error = %e,
                    "selection artifact unreadable, running the full suite"
                );
                Selection::FullSuite(SelectionReason::SelectionUnavailable(e.to_string()))
            }
        };

        // Discovery failure is fatal here: handing the worker a partial
        // suite would silently skip tests.
        let eligible = match selection {
            Selection::Subset(tests) => tests,
            Selection::FullSuite(reason) => {
                info!(reason = %reason, "expanding the full suite for sharding");
                discover_suite(&root, &config.selection.test_globs)?
            }
        };

        let store = DurationStore::load(&self.store_path(&root, &config));
        let plan = ShardPlan::build(&eligible, &store, self.shards)?;
        let tests = plan.assign(self.index)?;
        let estimated = plan.estimated_load(self.index)?;

        self.output_shard(tests, estimated, cli)
    }

    /// Explicit flag beats the config path beats the fingerprint default
    fn store_path(&self, root: &Path, config: &Config) -> PathBuf {
        if let Some(path) = &self.durations {
            return path.clone();
        }
        if let Some(path) = &config.durations.path {
            return path.clone();
        }
        DurationStore::default_path(root, &Fingerprint::current(&config.durations.group))
    }

    fn output_shard(&self, tests: &[String], estimated: f64, cli: &Cli) -> anyhow::Result<()> {
        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "shards": self.shards,
                    "index": self.index,
                    "estimated_seconds": estimated,
                    "tests": tests,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                // One test per line and nothing else: stdout feeds the runner
                for test in tests {
                    println!("{}", test);
                }
            }
        }
        Ok(())
    }
}

/// Configuration lives at the work tree root, not the invocation path
fn config_root(path: &Path) -> PathBuf {
    match GitRepo::discover(path) {
        Ok(repo) => repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(durations: Option<PathBuf>) -> AssignShardCommand {
        AssignShardCommand {
            selection: PathBuf::from("selection.txt"),
            shards: 2,
            index: 1,
            durations,
            repo: PathBuf::from("."),
        }
    }

    #[test]
    fn test_store_path_prefers_the_flag() {
        let mut config = Config::default();
        config.durations.path = Some(PathBuf::from("/etc/switchyard/store.json"));

        let cmd = command(Some(PathBuf::from("flag.json")));
        assert_eq!(
            cmd.store_path(Path::new("/repo"), &config),
            PathBuf::from("flag.json")
        );
    }

    #[test]
    fn test_store_path_falls_back_to_config() {
        let mut config = Config::default();
        config.durations.path = Some(PathBuf::from("/etc/switchyard/store.json"));

        let cmd = command(None);
        assert_eq!(
            cmd.store_path(Path::new("/repo"), &config),
            PathBuf::from("/etc/switchyard/store.json")
        );
    }

    #[test]
    fn test_store_path_defaults_to_fingerprint() {
        let config = Config::default();
        let path = command(None).store_path(Path::new("/repo"), &config);

        assert!(path.starts_with("/repo/.switchyard/durations"));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));
    }
}
