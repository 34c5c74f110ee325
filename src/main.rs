//! # reps-bootstrap - one-shot provisioning for the `test_db` MongoDB database
//!
//! ## Environment Variables
//!
//! - `DATABASE_URL` or `MONGODB_URL`: MongoDB connection string with admin rights
//! - `BOOTSTRAP_APP_NAME`: application name reported to the server (optional)
//! - `RUST_LOG`: log filter, defaults to `info`. Logs go to stderr.

use std::process::ExitCode;

use reps_bootstrap::{cli, log_error, o11y::error_chain};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli::cli().get_matches();

    match cli::handle_cli(matches).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error!(e, "bootstrap failed");
            eprintln!("Failed to bootstrap database: {}", error_chain(&e));
            ExitCode::FAILURE
        }
    }
}
