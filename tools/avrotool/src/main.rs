mod commands;
mod input;

use std::{io, process::ExitCode};

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{getmeta::GetmetaArgs, getschema::GetschemaArgs, tojson::TojsonArgs};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "avrotool", about = "Inspect Avro object container files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump records as JSON
    Tojson(TojsonArgs),
    /// Print the embedded schema
    Getschema(GetschemaArgs),
    /// Print file metadata
    Getmeta(GetmetaArgs),
}

fn main() -> Result<ExitCode> {
    // stdout carries data only
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Tojson(args) => args.run(),
        Commands::Getschema(args) => args.run().map(|()| ExitCode::SUCCESS),
        Commands::Getmeta(args) => args.run().map(|()| ExitCode::SUCCESS),
    }
}
