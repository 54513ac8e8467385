mod common;
mod logic;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use common::{FileCatalog, split_csv};
use logic::{PlaythroughResult, StrategyKind, run_strategies};
use reddale_game::{BundledCatalog, CatalogSource, PolicyCatalog};

#[derive(Debug, Parser)]
#[command(name = "reddale-tester", version = "0.1.0")]
#[command(about = "Automated playthroughs and invariant checks for the Mayor of Reddale engine")]
struct Args {
    /// Strategies to play (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    strategies: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["console", "json", "markdown"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Load the policy catalog from a JSON file instead of the bundled one
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let catalog = Arc::new(load_catalog(args.catalog.as_ref())?);
    let strategies = expand_strategies(&args.strategies)?;
    log::info!(
        "playing {} strategies over {} policies",
        strategies.len(),
        catalog.len()
    );

    let results = run_strategies(&catalog, &strategies, args.verbose);
    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available strategies:")?;
    for kind in StrategyKind::ALL {
        writeln!(
            output_target.writer(),
            "  {:15} - {}",
            kind.key(),
            kind.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🏙️  Reddale Automated Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn load_catalog(path: Option<&PathBuf>) -> Result<PolicyCatalog> {
    match path {
        Some(path) => FileCatalog::new(path)
            .load_catalog()
            .with_context(|| format!("failed to load catalog from {}", path.display())),
        None => BundledCatalog
            .load_catalog()
            .context("bundled policy catalog is invalid"),
    }
}

fn expand_strategies(strategies_arg: &str) -> Result<Vec<StrategyKind>> {
    let mut kinds = Vec::new();
    for token in split_csv(strategies_arg) {
        if token == "all" {
            kinds.extend(StrategyKind::ALL);
            continue;
        }
        let Some(kind) = StrategyKind::from_key(&token) else {
            bail!("unknown strategy `{token}` (see --list-strategies)");
        };
        kinds.push(kind);
    }
    let mut seen = Vec::with_capacity(kinds.len());
    kinds.retain(|kind| {
        if seen.contains(kind) {
            false
        } else {
            seen.push(*kind);
            true
        }
    });
    Ok(kinds)
}

fn write_reports(args: &Args, results: &[PlaythroughResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, results)?,
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Reddale Playthrough Results\n\n_No strategies played._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            let duration = start_time.elapsed();
            if results.is_empty() {
                writeln!(&mut output_target, "No strategies played.")?;
            } else {
                logic::reports::generate_console_report(&mut output_target, results, duration)?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
