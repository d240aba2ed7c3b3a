//! Verify transformers and decoding against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each vector file lists a body, how to read it, and either the expected
//! result or the expected error variant. Results are compared as parsed
//! values so field ordering in the vectors does not matter.

use resting_core::{
    Alias, ContentData, DecodeError, EncodingType, RestingError, ServiceResponse, TransformationType,
};
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
struct Record {
    name: String,
    #[serde(default)]
    price_cents: u32,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Order {
    product: String,
    quantity: u32,
}

/// Parse the format string from test vectors into `TransformationType`.
fn parse_format(s: &str) -> TransformationType {
    match s {
        "JSON" => TransformationType::Json,
        "XML" => TransformationType::Xml,
        other => panic!("unknown format: {other}"),
    }
}

fn response(body: &str) -> ServiceResponse {
    ServiceResponse::from_parts(200, Vec::new(), body.as_bytes().to_vec(), EncodingType::Utf8).unwrap()
}

fn assert_error_kind(name: &str, err: &RestingError, expected: &str) {
    let matched = match expected {
        "Parse" => matches!(err, RestingError::Parse { .. }),
        "Configuration" => matches!(err, RestingError::Configuration(_)),
        other => panic!("{name}: unknown expected_error: {other}"),
    };
    assert!(matched, "{name}: expected {expected}, got {err:?}");
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let raw = include_str!("../../test-vectors/lists.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let format = parse_format(case["format"].as_str().unwrap());
        let alias = case["alias"].as_str();
        let result = format.transform::<Record>(&response(case["body"].as_str().unwrap()), alias);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_error_kind(name, &err, expected_error.as_str().unwrap());
            if let RestingError::Parse { format: reported, .. } = err {
                assert_eq!(reported, format, "{name}: reported format");
            }
        } else {
            let records = result.unwrap();
            let expected: Vec<Record> = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(records, expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Maps
// ---------------------------------------------------------------------------

#[test]
fn map_test_vectors() {
    let raw = include_str!("../../test-vectors/maps.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let aliases = Alias::new().bind::<Record>("products").bind::<Order>("orders");

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let format = parse_format(case["format"].as_str().unwrap());
        let supplied = case["aliases"].as_bool().unwrap().then_some(&aliases);
        let result = format.transform_map(&response(case["body"].as_str().unwrap()), supplied);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            assert_error_kind(name, &err, expected_error.as_str().unwrap());
        } else {
            let map = result.unwrap();
            let counts = case["expected_counts"].as_object().unwrap();
            assert_eq!(map.len(), counts.len(), "{name}: key count");
            assert_eq!(
                map.get::<Record>("products").map(<[Record]>::len),
                counts["products"].as_u64().map(|n| n as usize),
                "{name}: products"
            );
            assert_eq!(
                map.get::<Order>("orders").map(<[Order]>::len),
                counts["orders"].as_u64().map(|n| n as usize),
                "{name}: orders"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

#[test]
fn decode_test_vectors() {
    let raw = include_str!("../../test-vectors/decode.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let encoding = EncodingType::from_label(case["encoding"].as_str().unwrap());
        let bytes: Vec<u8> = serde_json::from_value(case["bytes"].clone()).unwrap();
        let content = ContentData::new(bytes.clone(), encoding);
        assert_eq!(content.content_length(), bytes.len(), "{name}: length");

        if let Some(expected_error) = case.get("expected_error") {
            let err = content.text().unwrap_err();
            let matched = match expected_error.as_str().unwrap() {
                "Malformed" => matches!(err, DecodeError::Malformed { .. }),
                "UnknownEncoding" => matches!(err, DecodeError::UnknownEncoding(_)),
                "Binary" => matches!(err, DecodeError::Binary),
                other => panic!("{name}: unknown expected_error: {other}"),
            };
            assert!(matched, "{name}: got {err:?}");
            assert_eq!(content.bytes(), &bytes[..], "{name}: bytes kept");
        } else {
            let expected = case["expected_text"].as_str().unwrap();
            assert_eq!(content.text().unwrap(), expected, "{name}: text");
            assert_eq!(content.text().unwrap(), expected, "{name}: cached text");
        }
    }
}
