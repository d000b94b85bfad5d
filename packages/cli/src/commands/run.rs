use crate::config::Config;
use crate::script::{parse_script, ScriptRunner};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use xmledit_editor::{Document, EditSession};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// JSON-lines edit script
    pub script: PathBuf,

    /// Root container name (overrides config)
    #[arg(long)]
    pub root: Option<String>,

    /// Only print the final document
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn run(args: RunArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let script_path = resolve_path(cwd, &args.script);

    let source = fs::read_to_string(&script_path)
        .with_context(|| format!("Cannot read script {}", script_path.display()))?;
    let ops = parse_script(&source)?;

    if !args.quiet {
        eprintln!(
            "{} {} ({} operations)",
            "▶".bright_blue(),
            script_path.display(),
            ops.len()
        );
    }

    let session = replay(&config, args.root.as_deref(), &ops, io::stdout().lock(), args.quiet)?;
    let document = session.into_document();

    let mut stdout = io::stdout().lock();
    document.write_to(&mut stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Build a fresh session from `config` and apply `ops` to it
pub fn replay(
    config: &Config,
    root: Option<&str>,
    ops: &[crate::script::ScriptOp],
    out: impl Write,
    quiet: bool,
) -> Result<EditSession> {
    let root = root.unwrap_or(&config.root_name);
    let document = Document::new(config.document_name.as_str(), root);
    let mut session = EditSession::with_history(document, config.history());

    ScriptRunner::new(&mut session, out, quiet).run_all(ops)?;
    Ok(session)
}

pub(crate) fn resolve_path(cwd: &str, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        PathBuf::from(cwd).join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_uses_config() {
        let config = Config {
            root_name: "library".into(),
            max_history: 1,
            ..Config::default()
        };
        let ops = parse_script(
            r#"{"op": "add_container", "parent": "library", "name": "a"}
{"op": "add_container", "parent": "library", "name": "b"}
{"op": "undo"}
{"op": "undo"}"#,
        )
        .unwrap();

        let session = replay(&config, None, &ops, Vec::new(), true).unwrap();
        assert_eq!(session.document().name(), "document");
        // Only one level of history was kept
        assert!(session.find("a").is_some());
        assert!(session.find("b").is_none());
    }

    #[test]
    fn test_root_flag_overrides_config() {
        let ops = parse_script(r#"{"op": "add_leaf", "parent": "shelf", "name": "n", "text": "t"}"#)
            .unwrap();
        let session = replay(&Config::default(), Some("shelf"), &ops, Vec::new(), true).unwrap();
        assert!(session.document().serialize().contains("<shelf>"));
    }

    #[test]
    fn test_run_reads_relative_script() {
        let dir = tempfile::tempdir().unwrap();
        let cwd = dir.path().to_str().unwrap();
        fs::write(
            dir.path().join("edits.jsonl"),
            r#"{"op": "add_container", "parent": "root", "name": "book"}"#,
        )
        .unwrap();

        let args = RunArgs {
            script: PathBuf::from("edits.jsonl"),
            root: None,
            quiet: true,
        };
        run(args, cwd).unwrap();
    }

    #[test]
    fn test_run_missing_script_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = RunArgs {
            script: PathBuf::from("missing.jsonl"),
            root: None,
            quiet: true,
        };
        let err = run(args, dir.path().to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Cannot read script"));
    }
}
