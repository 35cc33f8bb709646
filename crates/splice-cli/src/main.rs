//! Splice CLI
//!
//! Validate, inspect and convert TimelineSchema documents.

mod commands;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use splice_interchange::InterchangeFormat;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "splice")]
#[command(about = "Non-destructive timeline toolkit")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a timeline file and report anything dropped while loading it
    Validate {
        /// TimelineSchema JSON file
        input: PathBuf,
    },

    /// Summarize tracks, clips and duration
    Info {
        /// TimelineSchema JSON file
        input: PathBuf,
    },

    /// Convert a timeline file to an interchange format
    Export {
        /// TimelineSchema JSON file
        input: PathBuf,

        /// Target format (otio, edl, fcpxml)
        #[arg(short, long)]
        format: InterchangeFormat,

        /// Output path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert an interchange file to TimelineSchema JSON
    Import {
        /// Input file; its extension selects the format
        input: PathBuf,

        /// Override the format implied by the extension
        #[arg(short, long)]
        format: Option<InterchangeFormat>,

        /// Output path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Commands::Validate { input } => println!("{}", commands::validate(&input)?),
        Commands::Info { input } => println!("{}", commands::info(&input)?),
        Commands::Export {
            input,
            format,
            output,
        } => write_output(output.as_deref(), &commands::export(&input, format)?)?,
        Commands::Import {
            input,
            format,
            output,
        } => write_output(output.as_deref(), &commands::import(&input, format)?)?,
    }

    Ok(())
}

fn init_tracing(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{text}"),
    }
    Ok(())
}
