//! seosync CLI: the `seosync` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use seosync_core::SyncMode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // stdout carries the report; logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sync { args } => commands::sync::run(args, SyncMode::Sync),
        Commands::Add { args } => commands::sync::run(args, SyncMode::AddOnly),
        Commands::Remove { args } => commands::sync::run(args, SyncMode::RemoveOnly),
        Commands::Plan { mode, args } => commands::plan::run(args, mode.into()),
        Commands::Keys { args } => commands::keys::run(args),
    }
}
