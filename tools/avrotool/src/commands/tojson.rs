use std::{
    io::{self, BufWriter},
    process::ExitCode,
};

use anyhow::{Context, Result};
use avro2json::{DumpOptions, HeadCount, dump_to_json};
use clap::{Args, Command};
use tracing::info;

use crate::input;

const SYNOPSIS: &str = "tojson [--pretty] [--head[=X]] input-file
Dumps an Avro data file as JSON, record per line or pretty.
A dash ('-') can be given as an input file to use stdin";

#[derive(Args)]
pub struct TojsonArgs {
    /// Turns on pretty printing
    #[arg(long)]
    pretty: bool,

    /// Converts the first X records (default is 10)
    #[arg(long, value_name = "X")]
    head: Option<Option<String>>,

    /// Input file, or - for standard input
    #[arg(value_name = "INPUT")]
    inputs: Vec<String>,
}

impl TojsonArgs {
    pub fn run(self) -> Result<ExitCode> {
        let Some((name, head)) = resolve_inputs(self.head, self.inputs) else {
            print_usage();
            return Ok(ExitCode::FAILURE);
        };

        let options = DumpOptions::new()
            .with_pretty(self.pretty)
            .with_head(head);
        let out = BufWriter::new(io::stdout().lock());
        let summary = dump_to_json(input::open(&name)?, out, &options)
            .with_context(|| format!("cannot convert {name}"))?;

        info!(
            records = summary.records,
            truncated = summary.truncated,
            "converted {name}"
        );
        Ok(ExitCode::SUCCESS)
    }
}

/// Pick the head count and the single input.
///
/// A `--head` value that is not an integer is an input name that followed a
/// bare `--head`. A negative head count never stops the dump.
fn resolve_inputs(
    head: Option<Option<String>>,
    mut inputs: Vec<String>,
) -> Option<(String, HeadCount)> {
    let head = match head {
        None => HeadCount::Unbounded,
        Some(None) => HeadCount::default_limit(),
        Some(Some(value)) => match value.parse::<i64>() {
            Ok(limit) => u64::try_from(limit).map_or(HeadCount::Unbounded, HeadCount::Limit),
            Err(_) => {
                inputs.insert(0, value);
                HeadCount::default_limit()
            }
        },
    };
    let [name] = <[String; 1]>::try_from(inputs).ok()?;
    Some((name, head))
}

fn print_usage() {
    let mut command = TojsonArgs::augment_args(Command::new("tojson"));
    eprintln!("{SYNOPSIS}\n");
    eprintln!("{}", command.render_help());
}
