use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rulebook_gen::{Config, Generator, RunReport, WriteOutcome};

#[derive(Parser)]
#[command(name = "rulebook-gen")]
#[command(about = "Generate Func/Action variants of the RuleBook templates for every arity")]
struct Cli {
    /// Config file (default: search upward for rulebook-gen.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Project root that source and output directories are relative to
    /// (default: the config file's directory, else the current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Lowest arity to generate
    #[arg(long)]
    min_arity: Option<usize>,

    /// Highest arity to generate
    #[arg(long)]
    max_arity: Option<usize>,

    /// Construct to generate, e.g. Rule (repeatable, replaces the configured set)
    #[arg(long = "construct")]
    constructs: Vec<String>,

    /// Arity produced by hand rather than generated (repeatable, replaces the configured set)
    #[arg(long = "skip-arity")]
    skip_arities: Vec<usize>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let (mut config, config_path) = Config::load(cli.config.as_deref(), &cwd)?;
    match &config_path {
        Some(path) => log::info!("Using config {}", path.display()),
        None => log::info!("No rulebook-gen.toml found, using defaults"),
    }

    if let Some(min_arity) = cli.min_arity {
        config.min_arity = min_arity;
    }
    if let Some(max_arity) = cli.max_arity {
        config.max_arity = max_arity;
    }
    if !cli.constructs.is_empty() {
        config.constructs = cli.constructs;
    }
    if !cli.skip_arities.is_empty() {
        config.skip_arities = cli.skip_arities.into_iter().collect();
    }

    let root = match cli.root {
        Some(root) => root,
        None => config_path
            .as_deref()
            .and_then(|path| path.parent())
            .map(PathBuf::from)
            .unwrap_or(cwd),
    };

    let generator = Generator::new(config, &root)?;
    let report = generator
        .run()
        .with_context(|| format!("Generation aborted in {}", root.display()))?;

    print_report(&report, &root);

    let code = exit_code(&report);
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// 0 when every artifact was written, 1 if any failed.
fn exit_code(report: &RunReport) -> i32 {
    if report.is_success() { 0 } else { 1 }
}

fn print_report(report: &RunReport, root: &std::path::Path) {
    println!("RuleBook Generation");
    println!("===================\n");

    for entry in &report.entries {
        let shown = entry.destination.strip_prefix(root).unwrap_or(&entry.destination);
        match &entry.result {
            Ok(WriteOutcome::Unchanged) => println!("  [SAME]  {}", shown.display()),
            Ok(_) => println!("  [WROTE] {}", shown.display()),
            Err(e) => {
                println!("  [FAIL]  {}", shown.display());
                println!("          Error: {}", e);
                let mut source = std::error::Error::source(e);
                while let Some(cause) = source {
                    println!("          Caused by: {}", cause);
                    source = std::error::Error::source(cause);
                }
            }
        }
    }

    let failed = report.failures().count();
    println!();
    println!("===================");
    println!(
        "{} created, {} replaced, {} unchanged, {} failed",
        report.count(WriteOutcome::Created),
        report.count(WriteOutcome::Replaced),
        report.count(WriteOutcome::Unchanged),
        failed
    );
}
