use std::io::{self, Write};

use anyhow::{Context, Result};
use avro2json::{ContainerReader, SCHEMA_KEY};
use clap::Args;

use crate::input;

#[derive(Args)]
pub struct GetschemaArgs {
    /// Input file, or - for standard input
    input: String,
}

impl GetschemaArgs {
    pub fn run(self) -> Result<()> {
        let mut reader = ContainerReader::open(input::open(&self.input)?)
            .with_context(|| format!("cannot read {}", self.input))?;
        let schema = reader
            .metadata()
            .get(SCHEMA_KEY)
            .context("container has no schema")?;
        let json: serde_json::Value = serde_json::from_slice(schema)?;
        reader.close();

        let mut out = io::stdout().lock();
        writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?;
        out.flush()?;
        Ok(())
    }
}
