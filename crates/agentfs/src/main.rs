//! agentfs CLI - Package agent directories and upload them to presigned URLs
//!
//! This is the main entry point for the agentfs command-line interface.

mod cli;
mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    // Must happen before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let config_dir = cli.config_dir.as_deref();
    let result = match cli.command {
        Commands::Upload(args) => commands::upload::run(args, config_dir).await,
        Commands::Pack(args) => commands::pack::run(args, config_dir),
        Commands::Size(args) => commands::size::run(args, config_dir),
    };

    if let Err(err) = result {
        output::error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
