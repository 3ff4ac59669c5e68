use std::{error::Error, fs, path::PathBuf};

use avro2json::{Codec, ContainerWriter, core::Value};
use predicates::prelude::*;
use tempfile::TempDir;

const USER: &str = r#"{"type":"record","name":"User","fields":[{"name":"id","type":"int"},{"name":"name","type":"string"}]}"#;

struct SampleFile {
    _dir: TempDir,
    path: PathBuf,
}

impl SampleFile {
    fn arg(&self) -> &str {
        self.path.to_str().expect("temp path should be UTF-8")
    }
}

fn build_sample_file(records: i32) -> Result<SampleFile, Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("users.avro");

    let mut writer = ContainerWriter::new(Vec::new(), USER)?
        .with_codec(Codec::Deflate)
        .with_metadata("origin", "cli-test");
    for id in 1..=records {
        let name = char::from(b'a' + (id as u8 - 1)).to_string();
        writer.append(&Value::record([
            ("id", Value::Int(id)),
            ("name", Value::string(name)),
        ]))?;
    }
    fs::write(&path, writer.finish()?)?;

    Ok(SampleFile { _dir: dir, path })
}

fn avrotool() -> Result<assert_cmd::Command, Box<dyn Error>> {
    Ok(assert_cmd::Command::cargo_bin("avrotool")?)
}

const ABC: &str = "{\"id\":1,\"name\":\"a\"}\n{\"id\":2,\"name\":\"b\"}\n{\"id\":3,\"name\":\"c\"}\n";

// ── tojson ───────────────────────────────────────────────────────────────────

#[test]
fn tojson_dumps_all_records() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(3)?;
    avrotool()?
        .args(["tojson", sample.arg()])
        .assert()
        .success()
        .stdout(ABC);
    Ok(())
}

#[test]
fn tojson_head_with_value() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(3)?;
    avrotool()?
        .args(["tojson", "--head=2", sample.arg()])
        .assert()
        .success()
        .stdout("{\"id\":1,\"name\":\"a\"}\n{\"id\":2,\"name\":\"b\"}\n");
    Ok(())
}

#[test]
fn tojson_bare_head_before_input() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(3)?;
    avrotool()?
        .args(["tojson", "--head", sample.arg()])
        .assert()
        .success()
        .stdout(ABC);
    Ok(())
}

#[test]
fn tojson_negative_head_dumps_everything() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(3)?;
    avrotool()?
        .args(["tojson", "--head=-1", sample.arg()])
        .assert()
        .success()
        .stdout(ABC);
    Ok(())
}

#[test]
fn tojson_head_zero_prints_newline() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(3)?;
    avrotool()?
        .args(["tojson", "--head=0", sample.arg()])
        .assert()
        .success()
        .stdout("\n");
    Ok(())
}

#[test]
fn tojson_pretty() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(1)?;
    avrotool()?
        .args(["tojson", "--pretty", sample.arg()])
        .assert()
        .success()
        .stdout("{\n  \"id\": 1,\n  \"name\": \"a\"\n}\n");
    Ok(())
}

#[test]
fn tojson_reads_stdin() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(3)?;
    avrotool()?
        .args(["tojson", "-"])
        .write_stdin(fs::read(&sample.path)?)
        .assert()
        .success()
        .stdout(ABC);
    Ok(())
}

#[test]
fn tojson_without_input_prints_usage() -> Result<(), Box<dyn Error>> {
    avrotool()?
        .arg("tojson")
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("tojson [--pretty] [--head[=X]] input-file"))
        .stderr(predicate::str::contains("--pretty"));
    Ok(())
}

#[test]
fn tojson_rejects_two_inputs() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(1)?;
    avrotool()?
        .args(["tojson", sample.arg(), sample.arg()])
        .assert()
        .code(1)
        .stdout("");
    Ok(())
}

#[test]
fn tojson_reports_malformed_file() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("bogus.avro");
    fs::write(&path, b"definitely not avro")?;

    avrotool()?
        .args(["tojson", path.to_str().expect("temp path should be UTF-8")])
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("not an Avro object container"));
    Ok(())
}

// ── getschema / getmeta ──────────────────────────────────────────────────────

#[test]
fn getschema_prints_pretty_schema() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(1)?;
    let output = avrotool()?
        .args(["getschema", sample.arg()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output)?;
    assert!(text.starts_with("{\n  \"type\": \"record\""));
    assert!(text.ends_with("}\n"));
    let parsed: serde_json::Value = serde_json::from_str(&text)?;
    assert_eq!(parsed, serde_json::from_str::<serde_json::Value>(USER)?);
    Ok(())
}

#[test]
fn getmeta_lists_sorted_entries() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(1)?;
    let output = avrotool()?
        .args(["getmeta", sample.arg()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output)?;
    let keys: Vec<&str> = text
        .lines()
        .filter_map(|line| line.split_once('\t').map(|(key, _)| key))
        .collect();
    assert_eq!(keys, ["avro.codec", "avro.schema", "origin"]);
    assert!(text.contains("avro.codec\tdeflate\n"));
    Ok(())
}

#[test]
fn getmeta_single_key() -> Result<(), Box<dyn Error>> {
    let sample = build_sample_file(1)?;
    avrotool()?
        .args(["getmeta", "--key", "origin", sample.arg()])
        .assert()
        .success()
        .stdout("cli-test\n");
    avrotool()?
        .args(["getmeta", "--key", "missing", sample.arg()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no metadata entry 'missing'"));
    Ok(())
}
