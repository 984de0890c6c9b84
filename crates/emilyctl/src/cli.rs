//! Command-line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "emilyctl")]
#[command(about = "Emily Assistant - run model-reply directives from the command line", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to $EMILY_CONFIG or the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Process a model reply: run its directives and print the cleaned text
    Process {
        /// Reply file (reads stdin when omitted)
        file: Option<PathBuf>,

        /// Log side effects instead of performing them
        #[arg(long)]
        dry_run: bool,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Omit the "Commands Results" section
        #[arg(long)]
        no_summary: bool,
    },

    /// Print the directives found in a reply as JSON
    Extract {
        /// Reply file (reads stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Print the Home Assistant directives available to the model
    HaCommands,

    /// Print the chat-session setup message
    Context,

    /// Show the effective configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}
