//! Shell completion generation command

use std::io;
use std::path::PathBuf;

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use tracing::info;

use crate::cli::{output, Cli};

/// Generate completion scripts for the switchyard binary
#[derive(Debug, Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to a file instead of stdout
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

impl CompletionsCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(shell = %self.shell, "generating completion script");

        match &self.out {
            Some(path) => {
                let mut file = std::fs::File::create(path)?;
                self.render(&mut file);
                if !cli.quiet {
                    output::success(&format!("Completions written to {}", path.display()));
                }
            }
            None => self.render(&mut io::stdout()),
        }

        Ok(())
    }

    fn render(&self, sink: &mut dyn io::Write) {
        let mut command = Cli::command();
        generate(self.shell, &mut command, "switchyard", sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_names_the_binary() {
        let command = CompletionsCommand {
            shell: Shell::Bash,
            out: None,
        };

        let mut buf = Vec::new();
        command.render(&mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("switchyard"));
    }
}
