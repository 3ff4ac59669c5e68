//! Bounded dump of a container's records as JSON units.

use std::io::{Read, Write};

use avro2json_json::JsonEncoder;
use tracing::debug;

use crate::{container::ContainerReader, error::DumpError};

/// Bound used when a head count is requested without a value.
pub const DEFAULT_HEAD_COUNT: u64 = 10;

/// How many records a dump may emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadCount {
    #[default]
    Unbounded,
    Limit(u64),
}

impl HeadCount {
    /// `Limit(DEFAULT_HEAD_COUNT)`.
    pub fn default_limit() -> Self {
        Self::Limit(DEFAULT_HEAD_COUNT)
    }

    fn allows(self, emitted: u64) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Limit(limit) => emitted < limit,
        }
    }
}

/// Options for [`dump_to_json`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DumpOptions {
    pub pretty: bool,
    pub head: HeadCount,
}

impl DumpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_head(mut self, head: HeadCount) -> Self {
        self.head = head;
        self
    }
}

/// What a successful dump wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpSummary {
    /// Number of JSON units written.
    pub records: u64,
    /// Whether the head count ended the dump before the container did.
    pub truncated: bool,
}

/// Read the container from `input` and write its records to `out` as JSON,
/// one unit per record, followed by a single newline.
///
/// The head count is checked before each record is pulled, so `Limit(0)`
/// decodes nothing and writes just the newline. The reader is closed once the
/// loop ends, whether it ended by exhaustion, by the bound, or by an error.
pub fn dump_to_json<R: Read, W: Write>(
    input: R,
    out: W,
    options: &DumpOptions,
) -> Result<DumpSummary, DumpError> {
    let mut reader = ContainerReader::open(input)?;
    let result = write_units(&mut reader, out, options);
    reader.close();

    let summary = result?;
    debug!(
        records = summary.records,
        truncated = summary.truncated,
        pretty = options.pretty,
        "dumped container"
    );
    Ok(summary)
}

fn write_units<R: Read, W: Write>(
    reader: &mut ContainerReader<R>,
    mut out: W,
    options: &DumpOptions,
) -> Result<DumpSummary, DumpError> {
    let schema = reader.shared_schema();
    let mut encoder = JsonEncoder::new(&schema, &mut out, options.pretty);

    let mut records = 0;
    let mut truncated = false;
    loop {
        if !options.head.allows(records) {
            truncated = true;
            break;
        }
        let Some(value) = reader.next() else {
            break;
        };
        encoder.write(&value?)?;
        records += 1;
    }
    encoder.flush()?;

    out.write_all(b"\n")?;
    out.flush()?;
    Ok(DumpSummary { records, truncated })
}
