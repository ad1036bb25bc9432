//! Quotes CLI Entry Point
//!
//! This binary provides the command-line interface for the quote store.

use std::process;

mod cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
