use std::{
    io::{self, Read, Write},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use avro2json::{
    Codec, ContainerError, ContainerWriter, DumpError, DumpOptions, DumpSummary, HeadCount,
    core::{ResolvedSchema, Value},
    dump_to_json,
    json::{EncodeError, JsonDecoder},
};

// ── helpers ──────────────────────────────────────────────────────────────────

const USER: &str = r#"{"type":"record","name":"User","fields":[{"name":"id","type":"int"},{"name":"name","type":"string"}]}"#;

fn user(id: i32, name: &str) -> Value {
    Value::record([("id", Value::Int(id)), ("name", Value::string(name))])
}

fn abc() -> Vec<Value> {
    vec![user(1, "a"), user(2, "b"), user(3, "c")]
}

fn container(values: &[Value], codec: Codec) -> Vec<u8> {
    let mut writer = ContainerWriter::new(Vec::new(), USER)
        .expect("schema should parse")
        .with_codec(codec)
        .with_block_size(2);
    for value in values {
        writer.append(value).expect("append should succeed");
    }
    writer.finish().expect("finish should succeed")
}

fn dump(data: &[u8], options: DumpOptions) -> (String, DumpSummary) {
    let mut out = Vec::new();
    let summary = dump_to_json(data, &mut out, &options).expect("dump should succeed");
    (String::from_utf8(out).expect("output should be UTF-8"), summary)
}

/// Read wrapper that records when it is dropped.
struct Tracked<R> {
    inner: R,
    dropped: Arc<AtomicBool>,
}

impl<R: Read> Read for Tracked<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R> Drop for Tracked<R> {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

/// Output that fails once more than `limit` bytes would be written.
struct Limited {
    written: Vec<u8>,
    limit: usize,
}

impl Write for Limited {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written.len() + buf.len() > self.limit {
            return Err(io::Error::other("output closed"));
        }
        self.written.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

const ABC_COMPACT: &str =
    "{\"id\":1,\"name\":\"a\"}\n{\"id\":2,\"name\":\"b\"}\n{\"id\":3,\"name\":\"c\"}\n";

// ── bounds ───────────────────────────────────────────────────────────────────

#[test]
fn dumps_every_record_without_head() {
    let data = container(&abc(), Codec::Null);
    let (text, summary) = dump(&data, DumpOptions::new());
    assert_eq!(text, ABC_COMPACT);
    assert_eq!(
        summary,
        DumpSummary {
            records: 3,
            truncated: false
        }
    );
}

#[test]
fn head_limits_records() {
    let data = container(&abc(), Codec::Null);
    let (text, summary) = dump(
        &data,
        DumpOptions::new().with_head(HeadCount::Limit(2)),
    );
    assert_eq!(text, "{\"id\":1,\"name\":\"a\"}\n{\"id\":2,\"name\":\"b\"}\n");
    assert_eq!(summary.records, 2);
    assert!(summary.truncated);
}

#[test]
fn head_larger_than_container_emits_all() {
    let data = container(&abc(), Codec::Null);
    let (text, summary) = dump(&data, DumpOptions::new().with_head(HeadCount::default_limit()));
    assert_eq!(text, ABC_COMPACT);
    assert_eq!(summary.records, 3);
    assert!(!summary.truncated);
}

#[test]
fn default_head_stops_at_ten() {
    let values: Vec<Value> = (1..=12).map(|id| user(id, "x")).collect();
    let data = container(&values, Codec::Null);
    let (text, summary) = dump(&data, DumpOptions::new().with_head(HeadCount::default_limit()));
    assert_eq!(text.lines().count(), 10);
    assert!(text.starts_with("{\"id\":1,"));
    assert!(text.ends_with("{\"id\":10,\"name\":\"x\"}\n"));
    assert_eq!(summary.records, 10);
}

#[test]
fn head_zero_writes_only_newline() {
    let data = container(&abc(), Codec::Null);
    let (text, summary) = dump(&data, DumpOptions::new().with_head(HeadCount::Limit(0)));
    assert_eq!(text, "\n");
    assert_eq!(summary.records, 0);
}

#[test]
fn empty_container_writes_only_newline() {
    let data = container(&[], Codec::Null);
    for pretty in [false, true] {
        for head in [HeadCount::Unbounded, HeadCount::Limit(0), HeadCount::Limit(5)] {
            let options = DumpOptions::new().with_pretty(pretty).with_head(head);
            let (text, summary) = dump(&data, options);
            assert_eq!(text, "\n", "{options:?}");
            assert_eq!(summary.records, 0);
        }
    }
}

// ── output form ──────────────────────────────────────────────────────────────

#[test]
fn pretty_output_is_indented_and_newline_terminated() {
    let data = container(&abc()[..1], Codec::Null);
    let (text, _) = dump(&data, DumpOptions::new().with_pretty(true));
    assert_eq!(text, "{\n  \"id\": 1,\n  \"name\": \"a\"\n}\n");
}

#[test]
fn both_modes_decode_back_to_the_records() {
    let schema = ResolvedSchema::parse_str(USER).expect("schema should parse");
    let data = container(&abc(), Codec::Null);
    for pretty in [false, true] {
        let (text, _) = dump(&data, DumpOptions::new().with_pretty(pretty));
        let values = JsonDecoder::new(&schema, text.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .expect("output should decode");
        assert_eq!(values, abc(), "pretty = {pretty}");
    }
}

#[test]
fn output_is_idempotent() {
    let data = container(&abc(), Codec::Null);
    let options = DumpOptions::new().with_pretty(true);
    assert_eq!(dump(&data, options), dump(&data, options));
}

#[test]
fn codecs_do_not_change_output() {
    for codec in Codec::ALL {
        let data = container(&abc(), codec);
        let (text, _) = dump(&data, DumpOptions::new());
        assert_eq!(text, ABC_COMPACT, "{codec}");
    }
}

// ── failures ─────────────────────────────────────────────────────────────────

#[test]
fn malformed_header_is_a_format_error() {
    let mut out = Vec::new();
    let err = dump_to_json(&b"not avro"[..], &mut out, &DumpOptions::new())
        .expect_err("dump should fail");
    assert!(matches!(err, DumpError::Container(ref e) if e.is_format_error()));
    assert!(out.is_empty());
}

#[test]
fn input_is_released_after_success() {
    let data = container(&abc(), Codec::Null);
    let dropped = Arc::new(AtomicBool::new(false));
    let input = Tracked {
        inner: data.as_slice(),
        dropped: Arc::clone(&dropped),
    };
    let mut out = Vec::new();
    dump_to_json(input, &mut out, &DumpOptions::new().with_head(HeadCount::Limit(1)))
        .expect("dump should succeed");
    assert!(dropped.load(Ordering::SeqCst));
}

#[test]
fn input_is_released_after_mid_stream_failure() {
    let mut data = container(&abc(), Codec::Null);
    let last = data.len() - 1;
    data[last] ^= 0xff;

    let dropped = Arc::new(AtomicBool::new(false));
    let input = Tracked {
        inner: data.as_slice(),
        dropped: Arc::clone(&dropped),
    };
    let mut out = Vec::new();
    let err = dump_to_json(input, &mut out, &DumpOptions::new()).expect_err("dump should fail");

    assert!(matches!(
        err,
        DumpError::Container(ContainerError::SyncMismatch { block: 1 })
    ));
    assert!(dropped.load(Ordering::SeqCst));
    // Records before the bad block were already written.
    assert_eq!(
        String::from_utf8(out).expect("output should be UTF-8"),
        "{\"id\":1,\"name\":\"a\"}\n{\"id\":2,\"name\":\"b\"}"
    );
}

#[test]
fn output_failure_is_an_encode_error_and_releases_input() {
    let data = container(&abc(), Codec::Null);
    let dropped = Arc::new(AtomicBool::new(false));
    let input = Tracked {
        inner: data.as_slice(),
        dropped: Arc::clone(&dropped),
    };
    let mut out = Limited {
        written: Vec::new(),
        limit: 25,
    };
    let err = dump_to_json(input, &mut out, &DumpOptions::new()).expect_err("dump should fail");

    assert!(
        matches!(
            err,
            DumpError::Encode(EncodeError::Io(_) | EncodeError::Json(_))
        ),
        "{err:?}"
    );
    assert!(dropped.load(Ordering::SeqCst));
    assert!(out.written.starts_with(b"{\"id\":1,\"name\":\"a\"}"));
}
