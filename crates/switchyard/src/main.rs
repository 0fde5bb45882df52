//! Switchyard - Cross-repository CI test orchestration CLI

mod cli;
mod exit_codes;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use cli::Cli;

fn main() {
    let _guard = init_tracing();

    let cli = Cli::parse();
    if let Err(err) = cli.execute() {
        cli::output::error(&format!("{:#}", err));
        std::process::exit(exit_code_for(&err));
    }
}

/// Map an error to the exit code CI scripts branch on
fn exit_code_for(err: &anyhow::Error) -> i32 {
    use switchyard_core::{ConfigError, GitError, RefError};
    use switchyard_select::ShardError;

    if err.downcast_ref::<RefError>().is_some() || err.downcast_ref::<ShardError>().is_some() {
        exit_codes::USAGE_ERROR
    } else if err.downcast_ref::<ConfigError>().is_some() {
        exit_codes::CONFIG_ERROR
    } else if err.downcast_ref::<GitError>().is_some() {
        exit_codes::GIT_ERROR
    } else {
        exit_codes::ERROR
    }
}

/// Set up tracing with two layers:
/// - Console: stderr, controlled by RUST_LOG (default: warn); stdout
///   stays reserved for command output that CI scripts capture
/// - File: always debug-level JSON to ~/.switchyard/logs/
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Some(log_dir) = log_directory() {
        let file_appender = tracing_appender::rolling::daily(&log_dir, "switchyard.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_filter(console_filter),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_filter(EnvFilter::new("debug")),
            )
            .init();

        return Some(guard);
    }

    // Fallback: console only
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(console_filter),
        )
        .init();

    None
}

/// Returns the log directory path, creating it if needed.
fn log_directory() -> Option<std::path::PathBuf> {
    let log_dir = dirs::home_dir()?.join(".switchyard").join("logs");
    std::fs::create_dir_all(&log_dir).ok()?;
    Some(log_dir)
}
