//! Tangle CLI binary.

use std::process::ExitCode;

use tangle::cli::Cli;
use tangle::output::{OutputConfig, color};
use tracing_subscriber::EnvFilter;

/// Main entry point for the tangle CLI.
///
/// Analysis is CPU-bound and input loading is sequential, so the
/// current_thread runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // RUST_LOG wins over -v.
    // Example: RUST_LOG=tangle=debug,tangle_jsonl=trace tangle cycles deps
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting tangle CLI");

    match cli.execute().await {
        Ok(code) => code,
        Err(err) => {
            let config = OutputConfig::from_env();
            eprintln!("{} {err}", color::error("error:", &config));
            for cause in err.chain().skip(1) {
                eprintln!("  {} {cause}", color::error("caused by:", &config));
            }
            ExitCode::FAILURE
        }
    }
}
