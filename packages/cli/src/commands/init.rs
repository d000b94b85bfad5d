use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

pub const EXAMPLE_SCRIPT_NAME: &str = "example.jsonl";

const EXAMPLE_SCRIPT: &str = r#"# Builds a one-book library, then undoes and redoes the last edit
{"op": "add_container", "parent": "library", "name": "book"}
{"op": "set_attribute", "node": "book", "key": "genre", "value": "fantasy"}
{"op": "add_leaf", "parent": "book", "name": "chapter1", "text": "Once upon a time"}
{"op": "undo"}
{"op": "redo"}
{"op": "find", "name": "chapter1"}
"#;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Document name written to the config
    #[arg(short, long, default_value = "document")]
    pub name: String,

    /// Root container name written to the config
    #[arg(short, long, default_value = "library")]
    pub root: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing xmledit project...".bright_blue().bold());

    // Create example script
    let example_file = PathBuf::from(cwd).join(EXAMPLE_SCRIPT_NAME);
    if !example_file.exists() || args.force {
        fs::write(&example_file, EXAMPLE_SCRIPT)?;
        println!("  {} Created {}", "✓".green(), EXAMPLE_SCRIPT_NAME);
    }

    // Create config
    let config = Config {
        document_name: args.name,
        root_name: args.root,
        ..Config::default()
    };

    // Write config file
    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}", EXAMPLE_SCRIPT_NAME);
    println!("  2. Run: xmledit run {}", EXAMPLE_SCRIPT_NAME);

    Ok(())
}
