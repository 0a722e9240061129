//! # Storefront Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          storefront (binary)                            │
//! │                                                                         │
//! │  main.rs ────► logging, argument parsing, exit code                    │
//! │  cli.rs ─────► config, database, session restore, one subcommand       │
//! │  commands/ ──► sign_in, add_address, submit_product, add_to_cart ...   │
//! │  views/ ─────► pages rendered from the state store                     │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │  SQLite (storefront.db, WAL) · image host (HTTPS) · PIN lookup (HTTPS) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use storefront_lib::cli::{run, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    storefront_lib::init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = ?e.code, "Command failed");
            eprintln!("{}", e.message);
            ExitCode::FAILURE
        }
    }
}
