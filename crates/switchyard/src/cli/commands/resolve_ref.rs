//! Resolve-ref command

use clap::Args;
use tracing::info;

use switchyard_core::config::load_config_or_default;
use switchyard_core::error::{GitError, RefError};
use switchyard_core::types::{BranchRef, RefPresence};
use switchyard_resolve::{resolve, CompanionRefs, LsRemoteCompanion, Resolution, ResolveRequest};

use crate::cli::{Cli, OutputFormat};

/// Resolve which companion repository branch this run should check out
#[derive(Debug, Args)]
pub struct ResolveRefCommand {
    /// Branch the triggering repository is on
    #[arg(long, env = "SWITCHYARD_CURRENT_REF")]
    pub current: String,

    /// Pull request base branch, if a pull request triggered the run
    #[arg(long, env = "SWITCHYARD_BASE_REF")]
    pub base: Option<String>,

    /// Use this companion branch verbatim, skipping resolution
    #[arg(long = "override", env = "SWITCHYARD_OVERRIDE_REF")]
    pub override_ref: Option<String>,

    /// Companion repository URL or path (defaults to [companion].remote)
    #[arg(long)]
    pub companion: Option<String>,

    /// Default branch both repositories converge on
    #[arg(long)]
    pub default_branch: Option<String>,
}

impl ResolveRefCommand {
    /// Execute the resolve-ref command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(current = %self.current, base = ?self.base, "executing resolve-ref command");
        let cwd = std::env::current_dir()?;
        let (config, _) = load_config_or_default(&cwd);

        let request = ResolveRequest {
            current: BranchRef::parse(&self.current)?,
            base: optional_ref(self.base.as_deref())?,
            override_ref: optional_ref(self.override_ref.as_deref())?,
        };
        let default_branch = match &self.default_branch {
            Some(name) => BranchRef::parse(name)?,
            None => BranchRef::parse(&config.companion.default_branch)?,
        };

        let location = self
            .companion
            .clone()
            .or_else(|| config.companion.remote.clone());
        let resolution = match location {
            Some(location) => {
                let companion = LsRemoteCompanion::new(location);
                resolve(&companion, &request, &default_branch)?
            }
            None => resolve(&Unconfigured, &request, &default_branch)?,
        };

        self.output_resolution(&resolution, cli)
    }

    fn output_resolution(&self, resolution: &Resolution, cli: &Cli) -> anyhow::Result<()> {
        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "ref": resolution.target.branch_name(),
                    "full_ref": resolution.target.full_name(),
                    "rule": resolution.rule,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                // Bare branch name so CI scripts can capture stdout directly
                println!("{}", resolution.target.branch_name());
            }
        }
        Ok(())
    }
}

/// CI systems export ref variables even when they do not apply, so a
/// blank value means absent rather than a malformed ref.
fn optional_ref(value: Option<&str>) -> Result<Option<BranchRef>, RefError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) => BranchRef::parse(name).map(Some),
    }
}

/// Stand-in for runs without a configured companion remote. Resolution
/// steps that never touch the companion still work; any step that needs
/// a lookup fails loudly instead of guessing.
struct Unconfigured;

impl CompanionRefs for Unconfigured {
    fn has_branch(&self, _branch: &BranchRef) -> Result<RefPresence, GitError> {
        Err(GitError::CompanionUnreachable {
            location: "<unconfigured>".to_string(),
            reason: "no companion remote; set [companion].remote in switchyard.toml or pass --companion"
                .to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_ref_treats_blank_as_absent() {
        assert_eq!(optional_ref(None).unwrap(), None);
        assert_eq!(optional_ref(Some("")).unwrap(), None);
        assert_eq!(optional_ref(Some("   ")).unwrap(), None);
    }

    #[test]
    fn test_optional_ref_parses_branch_names() {
        let parsed = optional_ref(Some("feature/login")).unwrap().unwrap();
        assert_eq!(parsed.full_name(), "refs/heads/feature/login");
    }

    #[test]
    fn test_optional_ref_rejects_non_branch_refs() {
        assert!(optional_ref(Some("refs/tags/v1.0.0")).is_err());
    }

    #[test]
    fn test_unconfigured_companion_fails_lookups() {
        let branch = BranchRef::parse("feature/login").unwrap();
        let err = Unconfigured.has_branch(&branch).unwrap_err();
        assert!(matches!(err, GitError::CompanionUnreachable { .. }));
    }
}
