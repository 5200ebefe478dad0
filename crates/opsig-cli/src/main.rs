//! opsig CLI: the `opsig` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_tracing(cli.verbose);

    match cli.command {
        Commands::Derive {
            manifest,
            config,
            json,
        } => commands::derive::run(manifest, config, json),

        Commands::Check {
            manifest,
            config,
            json,
        } => commands::check::run(manifest, config, json),
    }
}
