//! framebridge CLI - validate tables against declared schemas.

mod catalog;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Schemas { json } => commands::schemas::run(json, cli.verbose),

        Commands::Validate {
            file,
            schema,
            json,
            max_failures,
        } => commands::validate::run(file, schema, json, max_failures, cli.verbose),

        Commands::Salaries { file, json } => commands::salaries::run(file, json, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
