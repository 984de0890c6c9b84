//! Emily Control - CLI for the Emily assistant's directive engine
//!
//! Runs `@cmd[...]` directives found in a model reply and prints what the user sees.

use clap::Parser;
use emily_common::config::config_path;
use emily_common::EmilyConfig;
use emilyctl::cli::Cli;
use emilyctl::errors::exit_code_for;
use emilyctl::{commands, logging};

fn main() {
    let cli = Cli::parse();

    // Log level comes from the config when it is readable; errors surface later.
    let config_file = cli.config.clone().unwrap_or_else(config_path);
    let level = EmilyConfig::load_from(&config_file)
        .map(|c| c.log.level)
        .unwrap_or_else(|_| "info".to_string());
    logging::init_tracing(&level);

    if let Err(err) = commands::run(cli.command, cli.config.as_deref()) {
        eprintln!("emilyctl: {:#}", err);
        std::process::exit(exit_code_for(&err));
    }
}
