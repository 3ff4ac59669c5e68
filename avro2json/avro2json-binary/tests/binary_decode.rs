use avro2json_binary::{DecodeError, decode_value, encode_value};
use avro2json_core::{ConformanceError, ResolvedSchema, Value};
use bytes::Bytes;

// ── helpers ──────────────────────────────────────────────────────────────────

fn schema(text: &str) -> ResolvedSchema {
    ResolvedSchema::parse_str(text).expect("schema should parse")
}

fn decode_all(schema: &ResolvedSchema, data: Vec<u8>) -> Vec<Value> {
    let mut buf = Bytes::from(data);
    let mut out = Vec::new();
    while !buf.is_empty() {
        out.push(decode_value(schema, &mut buf).expect("decode should succeed"));
    }
    out
}

const USER: &str = r#"{
    "type": "record",
    "name": "User",
    "fields": [
        {"name": "id", "type": "int"},
        {"name": "name", "type": "string"}
    ]
}"#;

// ── decoding ─────────────────────────────────────────────────────────────────

#[test]
fn decodes_consecutive_records() {
    let schema = schema(USER);
    // id=1 (zig-zag 2), name="a"; id=2 (zig-zag 4), name="b"
    let data = vec![0x02, 0x02, b'a', 0x04, 0x02, b'b'];

    let values = decode_all(&schema, data);
    assert_eq!(
        values,
        vec![
            Value::record([("id", Value::Int(1)), ("name", Value::string("a"))]),
            Value::record([("id", Value::Int(2)), ("name", Value::string("b"))]),
        ]
    );
}

#[test]
fn decodes_union_enum_fixed_and_float() {
    let schema = schema(
        r#"{
            "type": "record",
            "name": "Mixed",
            "fields": [
                {"name": "maybe", "type": ["null", "long"]},
                {"name": "suit", "type": {"type": "enum", "name": "Suit", "symbols": ["SPADES", "HEARTS"]}},
                {"name": "hash", "type": {"type": "fixed", "name": "Hash", "size": 2}},
                {"name": "ratio", "type": "float"}
            ]
        }"#,
    );

    let mut data = vec![0x02, 0x54, 0x02, 0xab, 0xcd];
    data.extend_from_slice(&1.5f32.to_le_bytes());

    let values = decode_all(&schema, data);
    assert_eq!(
        values,
        vec![Value::record([
            ("maybe", Value::union(1, Value::Long(42))),
            ("suit", Value::enum_symbol(1, "HEARTS")),
            ("hash", Value::fixed([0xabu8, 0xcd])),
            ("ratio", Value::Float(1.5)),
        ])]
    );
}

#[test]
fn decodes_blocked_arrays_and_maps() {
    let schema = schema(
        r#"{
            "type": "record",
            "name": "Collections",
            "fields": [
                {"name": "nums", "type": {"type": "array", "items": "int"}},
                {"name": "attrs", "type": {"type": "map", "values": "boolean"}}
            ]
        }"#,
    );

    // nums: block of 2 [1, 2], block with negative count -1 and byte size 1 [3], end.
    // attrs: block of 1 {"k": true}, end.
    let data = vec![
        0x04, 0x02, 0x04, 0x01, 0x02, 0x06, 0x00, //
        0x02, 0x02, b'k', 0x01, 0x00,
    ];

    let values = decode_all(&schema, data);
    assert_eq!(
        values,
        vec![Value::record([
            (
                "nums",
                Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
            ),
            ("attrs", Value::map([("k", Value::Boolean(true))])),
        ])]
    );
}

#[test]
fn decodes_recursive_schema() {
    let schema = schema(
        r#"{
            "type": "record",
            "name": "Node",
            "fields": [
                {"name": "value", "type": "int"},
                {"name": "next", "type": ["null", "Node"]}
            ]
        }"#,
    );

    // Node(1) -> Node(2) -> null
    let data = vec![0x02, 0x02, 0x04, 0x00];
    let values = decode_all(&schema, data);
    assert_eq!(
        values,
        vec![Value::record([
            ("value", Value::Int(1)),
            (
                "next",
                Value::union(
                    1,
                    Value::record([
                        ("value", Value::Int(2)),
                        ("next", Value::union(0, Value::Null)),
                    ])
                )
            ),
        ])]
    );
}

// ── failures ─────────────────────────────────────────────────────────────────

#[test]
fn truncated_string_reports_field_path() {
    let schema = schema(USER);
    let mut buf = Bytes::from_static(&[0x02, 0x0a, b'a']);
    let err = decode_value(&schema, &mut buf).expect_err("decode should fail");
    assert!(matches!(err, DecodeError::UnexpectedEof { ref path } if path == "$.name"));
}

#[test]
fn union_index_out_of_range_fails() {
    let schema = schema(r#"["null", "string"]"#);
    let mut buf = Bytes::from_static(&[0x04]);
    let err = decode_value(&schema, &mut buf).expect_err("decode should fail");
    assert!(matches!(
        err,
        DecodeError::UnionIndex {
            index: 2,
            branches: 2,
            ..
        }
    ));
}

#[test]
fn invalid_boolean_byte_fails() {
    let schema = schema(r#""boolean""#);
    let mut buf = Bytes::from_static(&[0x07]);
    let err = decode_value(&schema, &mut buf).expect_err("decode should fail");
    assert!(format!("{err}").contains("invalid boolean byte 0x07"));
}

#[test]
fn int_outside_i32_range_fails() {
    let schema = schema(r#""int""#);
    let mut data: Vec<u8> = Vec::new();
    avro2json_binary::varint::put_long(&mut data, i64::from(i32::MAX) + 1);
    let mut buf = Bytes::from(data);
    let err = decode_value(&schema, &mut buf).expect_err("decode should fail");
    assert!(matches!(err, DecodeError::IntOutOfRange { .. }));
}

#[test]
fn array_count_beyond_remaining_bytes_fails_before_decoding() {
    let schema = schema(r#"{"type": "array", "items": "int"}"#);
    let mut data: Vec<u8> = Vec::new();
    avro2json_binary::varint::put_long(&mut data, 1000);
    data.extend_from_slice(&[0x02, 0x04]);
    let mut buf = Bytes::from(data);
    let err = decode_value(&schema, &mut buf).expect_err("decode should fail");
    assert!(matches!(
        err,
        DecodeError::BlockCount {
            count: 1000,
            remaining: 2,
            ..
        }
    ));
}

#[test]
fn negative_block_count_is_checked_too() {
    let schema = schema(r#"{"type": "map", "values": "string"}"#);
    let mut data: Vec<u8> = Vec::new();
    avro2json_binary::varint::put_long(&mut data, -(1 << 40));
    avro2json_binary::varint::put_long(&mut data, 8);
    let mut buf = Bytes::from(data);
    let err = decode_value(&schema, &mut buf).expect_err("decode should fail");
    assert!(matches!(err, DecodeError::BlockCount { count, .. } if count == 1 << 40));
}

#[test]
fn zero_width_items_are_capped() {
    let schema = schema(r#"{"type": "array", "items": "null"}"#);
    let mut data: Vec<u8> = Vec::new();
    avro2json_binary::varint::put_long(&mut data, 1 << 40);
    let mut buf = Bytes::from(data);
    let err = decode_value(&schema, &mut buf).expect_err("decode should fail");
    assert!(matches!(
        err,
        DecodeError::TooManyItems { limit, .. } if limit == avro2json_binary::MAX_ZERO_WIDTH_ITEMS
    ));
}

#[test]
fn small_zero_width_arrays_still_decode() {
    let schema = schema(
        r#"{"type": "array", "items": {"type": "record", "name": "Empty", "fields": []}}"#,
    );
    let mut buf = Bytes::from_static(&[0x06, 0x00]);
    let value = decode_value(&schema, &mut buf).expect("decode should succeed");
    assert_eq!(
        value,
        Value::Array(vec![
            Value::Record(vec![]),
            Value::Record(vec![]),
            Value::Record(vec![]),
        ])
    );
}

// ── encoding ─────────────────────────────────────────────────────────────────

#[test]
fn encoder_output_decodes_to_same_value() {
    let schema = schema(
        r#"{
            "type": "record",
            "name": "Event",
            "fields": [
                {"name": "id", "type": "long"},
                {"name": "tags", "type": {"type": "array", "items": "string"}},
                {"name": "note", "type": ["null", "string"]},
                {"name": "payload", "type": "bytes"}
            ]
        }"#,
    );
    let value = Value::record([
        ("id", Value::Long(-5)),
        (
            "tags",
            Value::Array(vec![Value::string("x"), Value::string("yz")]),
        ),
        ("note", Value::union(1, Value::string("hi"))),
        ("payload", Value::bytes([0u8, 255])),
    ]);

    let mut data: Vec<u8> = Vec::new();
    encode_value(&schema, &value, &mut data).expect("encode should succeed");
    assert_eq!(decode_all(&schema, data), vec![value]);
}

#[test]
fn encoder_picks_first_matching_union_branch() {
    let schema = schema(r#"["null", "int", "string"]"#);
    let mut data: Vec<u8> = Vec::new();
    encode_value(&schema, &Value::string("s"), &mut data).expect("encode should succeed");
    assert_eq!(data, vec![0x04, 0x02, b's']);
}

#[test]
fn encoder_rejects_missing_record_field() {
    let schema = schema(USER);
    let value = Value::record([("id", Value::Int(1))]);
    let err = encode_value(&schema, &value, &mut Vec::<u8>::new()).expect_err("encode should fail");
    assert!(matches!(err, ConformanceError::MissingField { ref field, .. } if field == "name"));
}
