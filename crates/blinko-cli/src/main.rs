//! Blinko CLI - reorder and edit Blinko notes from the terminal
//!
//! Works against a local libSQL note database, or a Blinko server when the
//! active profile names an endpoint.

mod cli;
mod commands;
mod config_profiles;
mod credentials;
mod error;

use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::common::CliContext;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::draft::run_draft;
use crate::commands::list::run_list;
use crate::commands::move_note::run_move;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Completions { shell, output } => run_completions(shell, output.as_deref()),
        Commands::Config { command } => run_config(command, cli.profile.as_deref()),
        command => {
            let context =
                CliContext::resolve(cli.db_path, cli.profile.as_deref(), cli.config.as_deref())?;
            match command {
                Commands::List {
                    limit,
                    tag,
                    sort,
                    json,
                } => run_list(&context, limit, tag, sort, json).await,
                Commands::Add { content } => run_add(&context, &content).await,
                Commands::Move { id, onto } => run_move(&context, id, onto).await,
                Commands::Draft { command } => run_draft(&context, command).await,
                Commands::Completions { .. } | Commands::Config { .. } => Ok(()),
            }
        }
    }
}

fn init_tracing() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "blinko=info".parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests;
