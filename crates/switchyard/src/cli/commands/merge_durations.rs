//! Merge-durations command

use std::path::{Path, PathBuf};

use clap::Args;
use tracing::{info, warn};

use switchyard_core::config::{load_config_or_default, Config};
use switchyard_git::GitRepo;
use switchyard_select::{DurationStore, Fingerprint};

use crate::cli::{output, Cli, OutputFormat};

/// Fold measured test durations into the history store
#[derive(Debug, Args)]
pub struct MergeDurationsCommand {
    /// Timing reports to merge, in order (later reports win per test)
    #[arg(long = "report", required = true)]
    pub reports: Vec<PathBuf>,

    /// Duration store path (defaults to the fingerprint-derived store)
    #[arg(long)]
    pub durations: Option<PathBuf>,

    /// Write the merged store here instead of back to the store path
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Repository the store belongs to
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,
}

impl MergeDurationsCommand {
    /// Execute the merge-durations command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(reports = self.reports.len(), "executing merge-durations command");
        let root = config_root(&self.repo);
        let (config, _) = load_config_or_default(&root);

        let store_path = self.store_path(&root, &config);
        let mut store = DurationStore::load(&store_path);
        let known_before = store.len();
        let updated = fold_reports(&mut store, &self.reports);

        let out = self.out.clone().unwrap_or(store_path);
        store.save(&out)?;

        self.output_merge(known_before, store.len(), updated, &out, cli)
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

    fn output_merge(
        &self,
        known_before: usize,
        known_after: usize,
        updated: usize,
        out: &Path,
        cli: &Cli,
    ) -> anyhow::Result<()> {
        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "known_before": known_before,
                    "known_after": known_after,
                    "updated": updated,
                    "out": out,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    output::success(&format!(
                        "merged {} measurements into {} ({} tests known)",
                        updated,
                        out.display(),
                        known_after
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Folds each report into the store in argument order, so later reports win
/// per test. Returns the number of measurements applied.
fn fold_reports(store: &mut DurationStore, reports: &[PathBuf]) -> usize {
    let mut updated = 0usize;
    for report_path in reports {
        let report = DurationStore::load(report_path);
        if report.is_empty() {
            warn!(path = %report_path.display(), "timing report contributed no measurements");
        }
        updated += report.len();
        store.merge(report.as_map());
    }
    updated
}

/// Configuration lives at the work tree root, not the invocation path
fn config_root(path: &Path) -> PathBuf {
    match GitRepo::discover(path) {
        Ok(repo) => repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf(),
        Err(_) => path.to_path_buf(),
    }
}
