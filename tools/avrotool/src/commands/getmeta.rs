use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use avro2json::ContainerReader;
use clap::Args;

use crate::input;

#[derive(Args)]
pub struct GetmetaArgs {
    /// Input file, or - for standard input
    input: String,

    /// Print only the value of this entry
    #[arg(short, long)]
    key: Option<String>,
}

impl GetmetaArgs {
    pub fn run(self) -> Result<()> {
        let mut reader = ContainerReader::open(input::open(&self.input)?)
            .with_context(|| format!("cannot read {}", self.input))?;
        let metadata = reader.metadata().clone();
        reader.close();

        let mut out = BufWriter::new(io::stdout().lock());
        match &self.key {
            Some(key) => {
                let value = metadata
                    .get(key)
                    .with_context(|| format!("no metadata entry '{key}'"))?;
                writeln!(out, "{}", String::from_utf8_lossy(value))?;
            }
            None => {
                for (key, value) in &metadata {
                    writeln!(out, "{key}\t{}", String::from_utf8_lossy(value))?;
                }
            }
        }
        out.flush()?;
        Ok(())
    }
}
