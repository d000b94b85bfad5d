mod commands;
mod config;
mod script;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{build, init, run, BuildArgs, InitArgs, RunArgs};
use tracing_subscriber::EnvFilter;

/// xmledit - scriptable editing of XML-like documents with undo/redo
#[derive(Parser, Debug)]
#[command(name = "xmledit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a config file and an example script
    Init(InitArgs),

    /// Replay an edit script and print the resulting document
    Run(RunArgs),

    /// Generate a document from a JSON description
    Build(BuildArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = std::env::current_dir()
        .context("Cannot get current directory")
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Run(args) => run(args, &cwd),
                Command::Build(args) => build(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
