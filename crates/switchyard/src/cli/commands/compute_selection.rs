//! Compute-selection command

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{info, warn};

use switchyard_core::config::load_config_or_default;
use switchyard_git::GitRepo;
use switchyard_select::{compute_selection, write_selection, Selection, Trigger};

use crate::cli::{output, Cli, OutputFormat};

/// Compute the set of tests worth running for a change
#[derive(Debug, Args)]
pub struct ComputeSelectionCommand {
    /// Repository to inspect
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Pull request base commit (requires --head-sha)
    #[arg(long, requires = "head_sha", env = "SWITCHYARD_BASE_SHA")]
    pub base_sha: Option<String>,

    /// Pull request head commit (requires --base-sha)
    #[arg(long, requires = "base_sha", env = "SWITCHYARD_HEAD_SHA")]
    pub head_sha: Option<String>,

    /// Where to write the selection artifact
    #[arg(long, short, default_value = ".switchyard/selection.txt")]
    pub out: PathBuf,
}

impl ComputeSelectionCommand {
    /// Execute the compute-selection command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(repo = %self.repo.display(), out = %self.out.display(), "executing compute-selection command");
        let (config, _) = load_config_or_default(&config_root(&self.repo));

        let selection = compute_selection(&self.repo, &config.selection, &self.trigger());
        write_selection(&self.out, &selection)?;

        self.output_selection(&selection, cli)
    }

    /// Decide the trigger kind from the commit pair.
    ///
    /// CI systems export the variables on every build, so blank values
    /// mean a push rather than a malformed pull request.
    fn trigger(&self) -> Trigger {
        let base_sha = self.base_sha.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let head_sha = self.head_sha.as_deref().map(str::trim).filter(|s| !s.is_empty());

        match (base_sha, head_sha) {
            (Some(base), Some(head)) => Trigger::PullRequest {
                base_sha: base.to_string(),
                head_sha: head.to_string(),
            },
            (None, None) => Trigger::Push,
            _ => {
                warn!("only one of base and head provided, treating the run as a push");
                Trigger::Push
            }
        }
    }

    fn output_selection(&self, selection: &Selection, cli: &Cli) -> anyhow::Result<()> {
        match cli.format {
            OutputFormat::Json => {
                let output = match selection {
                    Selection::Subset(tests) => serde_json::json!({
                        "mode": "subset",
                        "count": tests.len(),
                        "out": self.out,
                    }),
                    Selection::FullSuite(reason) => serde_json::json!({
                        "mode": "full_suite",
                        "reason": reason.to_string(),
                        "out": self.out,
                    }),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    match selection {
                        Selection::Subset(tests) => {
                            output::success(&format!("selected {} test files", tests.len()));
                            if cli.verbose {
                                for test in tests {
                                    println!("  {}", test);
                                }
                            }
                        }
                        Selection::FullSuite(reason) => {
                            output::warning(&format!("running the full suite: {}", reason));
                        }
                    }
                    output::info(&format!("selection written to {}", self.out.display()));
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

    fn command(base_sha: Option<&str>, head_sha: Option<&str>) -> ComputeSelectionCommand {
        ComputeSelectionCommand {
            repo: PathBuf::from("."),
            base_sha: base_sha.map(String::from),
            head_sha: head_sha.map(String::from),
            out: PathBuf::from("selection.txt"),
        }
    }

    #[test]
    fn test_trigger_push_without_commit_pair() {
        assert!(matches!(command(None, None).trigger(), Trigger::Push));
    }

    #[test]
    fn test_trigger_pull_request_with_commit_pair() {
        let trigger = command(Some("abc123"), Some("def456")).trigger();
        match trigger {
            Trigger::PullRequest { base_sha, head_sha } => {
                assert_eq!(base_sha, "abc123");
                assert_eq!(head_sha, "def456");
            }
            Trigger::Push => panic!("expected a pull request trigger"),
        }
    }

    #[test]
    fn test_trigger_treats_blank_shas_as_push() {
        assert!(matches!(command(Some(""), Some("")).trigger(), Trigger::Push));
        assert!(matches!(command(Some("  "), None).trigger(), Trigger::Push));
    }
}
