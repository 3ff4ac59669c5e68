use std::{
    fs::File,
    io::{self, Read},
};

use anyhow::{Context, Result};

/// Open a named input; `-` is standard input.
pub fn open(name: &str) -> Result<Box<dyn Read>> {
    if name == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(name).with_context(|| format!("cannot open {name}"))?;
    Ok(Box::new(file))
}
