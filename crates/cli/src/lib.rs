use anyhow::{Context as AnyhowContext, Result};
use ciri_impact::{compute, split, AllocationRow, ImpactResult, InputSet};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

pub mod config;
pub mod input;
pub mod report;
pub mod seed;
pub mod validate;

use config::{PathOverrides, RunPaths};

fn print_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "ciri")]
#[command(about = "CIRI economic impact model with CIBS allocation seed", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file with input/output paths (default: ./ciri.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the impact report and write the CIBS allocation seed
    Run(RunArgs),

    /// Split an arbitrary total across the allocation buckets
    Allocate(AllocateArgs),

    /// Check the input file and the last allocation table without computing
    Validate(ValidateArgs),
}

#[derive(Args)]
struct PathArgs {
    /// Input CSV (header row + one data record)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Allocation table CSV to write
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    paths: PathArgs,

    /// Bucket template CSV (`program,percent`); built-in buckets otherwise
    #[arg(long)]
    buckets: Option<PathBuf>,

    /// Print JSON instead of the text report
    #[arg(long)]
    json: bool,

    /// Compute and report only; do not write the allocation table
    #[arg(long)]
    no_seed: bool,
}

#[derive(Args)]
struct AllocateArgs {
    /// Total to split (may be zero or negative)
    #[arg(long, allow_hyphen_values = true)]
    total: f64,

    /// Allocation table CSV to write
    #[arg(long)]
    output: Option<PathBuf>,

    /// Bucket template CSV (`program,percent`); built-in buckets otherwise
    #[arg(long)]
    buckets: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Print only; do not write the allocation table
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct ValidateArgs {
    #[command(flatten)]
    paths: PathArgs,

    /// Print findings as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RunOutput<'a> {
    inputs: &'a InputSet,
    impact: &'a ImpactResult,
    allocation: &'a [AllocationRow],
    output_path: Option<String>,
}

#[derive(Serialize)]
struct AllocateOutput<'a> {
    total: f64,
    allocation: &'a [AllocationRow],
    output_path: Option<String>,
}

pub fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON consumers.
    let json_output = match &cli.command {
        Commands::Run(args) => args.json,
        Commands::Allocate(args) => args.json,
        Commands::Validate(args) => args.json,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Run(args) => {
            let paths = RunPaths::resolve(
                config,
                PathOverrides {
                    input: args.paths.input.clone(),
                    output: args.paths.output.clone(),
                    buckets: args.buckets.clone(),
                },
            )?;
            run_model(&paths, &args)
        }
        Commands::Allocate(args) => {
            let paths = RunPaths::resolve(
                config,
                PathOverrides {
                    output: args.output.clone(),
                    buckets: args.buckets.clone(),
                    ..PathOverrides::default()
                },
            )?;
            run_allocate(&paths, &args)
        }
        Commands::Validate(args) => {
            let paths = RunPaths::resolve(
                config,
                PathOverrides {
                    input: args.paths.input.clone(),
                    output: args.paths.output.clone(),
                    ..PathOverrides::default()
                },
            )?;
            run_validate(&paths, &args)
        }
    }
}

fn run_model(paths: &RunPaths, args: &RunArgs) -> Result<()> {
    let inputs = input::load_inputs(&paths.input_path)?;
    let buckets = seed::resolve_buckets(paths.buckets_path.as_deref())?;

    let impact = compute(&inputs);
    if impact.total_impact < 0.0 {
        log::warn!(
            "total impact is negative ({}); allocations will be negative",
            report::money(impact.total_impact)
        );
    }
    let allocation = split(impact.total_impact, &buckets);

    // Print before writing: a failed table write must not hide the figures.
    if args.json {
        let output_path = if args.no_seed {
            None
        } else {
            Some(paths.output_path.display().to_string())
        };
        let out = RunOutput {
            inputs: &inputs,
            impact: &impact,
            allocation: &allocation,
            output_path,
        };
        let text = serde_json::to_string_pretty(&out).context("Failed to serialize output")?;
        print_stdout(&text)?;
    } else {
        print_stdout(report::render_impact_report(&impact).trim_end())?;
        if args.no_seed {
            let table = report::render_allocation(impact.total_impact, &allocation);
            print_stdout(&format!("\n{}", table.trim_end()))?;
        }
    }

    if args.no_seed {
        return Ok(());
    }
    seed::write_allocation_table(&paths.output_path, &allocation)?;
    if !args.json {
        let path = paths.output_path.display();
        print_stdout(&format!("\nDraft CIBS allocation saved to: {path}"))?;
    }
    Ok(())
}

fn run_allocate(paths: &RunPaths, args: &AllocateArgs) -> Result<()> {
    if !args.total.is_finite() {
        anyhow::bail!("--total must be a finite number");
    }
    let buckets = seed::resolve_buckets(paths.buckets_path.as_deref())?;
    let allocation = split(args.total, &buckets);

    let written = if args.dry_run {
        None
    } else {
        seed::write_allocation_table(&paths.output_path, &allocation)?;
        Some(paths.output_path.display().to_string())
    };

    if args.json {
        let out = AllocateOutput {
            total: args.total,
            allocation: &allocation,
            output_path: written,
        };
        let text = serde_json::to_string_pretty(&out).context("Failed to serialize output")?;
        return print_stdout(&text);
    }

    let mut text = report::render_allocation(args.total, &allocation);
    if let Some(path) = written {
        text.push_str(&format!("\nSaved to: {path}"));
    }
    print_stdout(text.trim_end())
}

fn run_validate(paths: &RunPaths, args: &ValidateArgs) -> Result<()> {
    let findings = validate::validate(paths);
    if args.json {
        let text =
            serde_json::to_string_pretty(&findings).context("Failed to serialize findings")?;
        print_stdout(&text)?;
    } else {
        print_stdout(&findings.render())?;
    }

    if !findings.is_ok() {
        anyhow::bail!("validation failed with {} error(s)", findings.errors.len());
    }
    Ok(())
}
