mod cli;
mod commands;
mod config;
mod error;
mod output;

use crate::{
    cli::{Args, Commands},
    commands::CommandExecutor,
    config::AppConfig,
    error::Result,
    output::OutputManager,
};
use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use std::io::IsTerminal;
use std::process;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("Application error: {}", e);
        #[cfg(feature = "colored-output")]
        {
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
        #[cfg(not(feature = "colored-output"))]
        {
            eprintln!("Error: {}", e);
        }
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.quiet)?;

    let config = AppConfig::load(args.config.as_deref())?;
    debug!(?config, "Configuration loaded");

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let output = OutputManager::new(std::io::stdout().is_terminal());
    let executor = CommandExecutor::new(config, output, token);

    match args.command {
        Commands::Filter {
            source,
            source_url,
            output,
            json,
        } => {
            executor
                .filter(&source, source_url.as_deref(), output.as_deref(), json)
                .await
        }
        Commands::Inspect {
            source,
            source_url,
            format,
        } => {
            executor
                .inspect(&source, source_url.as_deref(), format)
                .await
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    // Logs go to stderr so playlists can be piped from stdout.
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .init();
    Ok(())
}
