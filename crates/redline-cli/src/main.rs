use anyhow::{Context, Result};
use clap::Parser;
use redline_config::Config;
use redline_engine::editing::AmbiguityPolicy;
use redline_engine::io::{load_edit_requests, store_for_path};
use redline_engine::{EditEngine, EditOptions, EditReport, LogEntry};
use std::{fs, path::Path, path::PathBuf, process};

#[derive(Parser, Debug)]
#[command(name = "redline")]
#[command(about = "Apply contextual edit requests to a document", long_about = None)]
struct Args {
    /// Document to edit (.json, .md or .markdown)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// JSON file with the edit requests
    #[arg(short, long, value_name = "FILE")]
    edits: PathBuf,

    /// Where to write the edited document (default: <input>_redlined.<ext>)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Config file to use instead of ~/.config/redline/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Author recorded on tracked changes and comments
    #[arg(long, value_name = "NAME")]
    author: Option<String>,

    /// Replace text in place instead of recording tracked changes
    #[arg(long)]
    no_track_changes: bool,

    /// Attach each edit's reason as a comment
    #[arg(long)]
    comments: bool,

    #[arg(long)]
    ignore_case: bool,

    /// Use the first occurrence when the context text is ambiguous
    #[arg(long)]
    first_match: bool,

    /// Let any whitespace in the request match any whitespace in the document
    #[arg(long)]
    normalize_whitespace: bool,

    /// Allow context text to span paragraph boundaries
    #[arg(long)]
    cross_paragraph: bool,

    /// Apply edits in memory and print the report without saving
    #[arg(long)]
    dry_run: bool,

    /// Also write the edit log as JSON
    #[arg(long, value_name = "PATH")]
    log_json: Option<PathBuf>,
}

/// Command-line flags only ever switch behaviour on top of the config file
fn apply_overrides(mut options: EditOptions, args: &Args) -> EditOptions {
    if let Some(author) = &args.author {
        options.author_name = author.clone();
    }
    if args.no_track_changes {
        options.add_tracked_changes = false;
    }
    if args.comments {
        options.add_comments = true;
    }
    if args.ignore_case {
        options.case_sensitive = false;
    }
    if args.first_match {
        options.ambiguity_policy = AmbiguityPolicy::FirstMatch;
    }
    if args.normalize_whitespace {
        options.normalize_whitespace = true;
    }
    if args.cross_paragraph {
        options.cross_paragraph_context = true;
    }
    options
}

fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load_from_path(path)?
            .with_context(|| format!("Config file '{}' not found", path.display())),
        None => Ok(Config::load()?.unwrap_or_default()),
    }
}

fn write_log(path: &Path, log: &[LogEntry]) -> Result<()> {
    let json = serde_json::to_string_pretty(log)?;
    fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write edit log to '{}'", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let options = apply_overrides(config.editing.clone(), &args);
    let requests = load_edit_requests(&args.edits)
        .with_context(|| format!("Failed to read edit requests from '{}'", args.edits.display()))?;
    let engine = EditEngine::new(options);

    let report = if args.dry_run {
        let store = store_for_path(&args.input)?;
        let mut document = match store.load(&args.input) {
            Ok(document) => document,
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        };
        engine.apply_edits(&mut document, &requests)
    } else {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| config.output_path_for(&args.input));
        match engine.run(&args.input, &output, &requests) {
            Ok(outcome) => {
                println!("Saved {}", outcome.output_path.display());
                EditReport::new(outcome.log)
            }
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    };

    print!("{}", report.summary());
    if let Some(path) = &args.log_json {
        write_log(path, &report.log)?;
    }
    Ok(())
}
