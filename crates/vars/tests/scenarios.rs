//! End-to-end scenarios across values, variables and collections.

use pretty_assertions::assert_eq;
use rstest::rstest;
use sdk_vars::{
    kind_of, new_as, new_value, new_variable, parse_key, parse_variable_from_string, Complex128,
    Duration, Error, KeyError, Kind, Map, ReadOnlyMap, Value, ValueError,
};

// ============================================================================
// KEYS
// ============================================================================

#[rstest]
#[case(" key ", "key")]
#[case("'quoted'", "quoted")]
#[case("app name", "app name")]
#[case("über.größe", "über.größe")]
fn keys_normalize(#[case] input: &str, #[case] want: &str) {
    assert_eq!(parse_key(input).unwrap(), want);
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("2fast")]
#[case("a=b")]
#[case("a$b")]
#[case("a\u{7}b")]
fn keys_reject(#[case] input: &str) {
    assert!(parse_key(input).is_err(), "{input:?}");
}

// ============================================================================
// VALUES
// ============================================================================

#[rstest]
#[case(new_value(true).unwrap(), Kind::Bool, "true")]
#[case(new_value(i8::MIN).unwrap(), Kind::Int8, "-128")]
#[case(new_value(u32::MAX).unwrap(), Kind::Uint32, "4294967295")]
#[case(new_value(1000000000.5_f32).unwrap(), Kind::Float32, "1e+09")]
#[case(new_value(123456.0_f64).unwrap(), Kind::Float64, "123456")]
#[case(new_value(1234567.0_f64).unwrap(), Kind::Float64, "1.234567e+06")]
#[case(new_value(0.00001_f64).unwrap(), Kind::Float64, "1e-05")]
#[case(new_value(-0.0_f64).unwrap(), Kind::Float64, "-0")]
#[case(new_value(f64::NEG_INFINITY).unwrap(), Kind::Float64, "-Inf")]
#[case(new_value(Complex128::new(0.0, 1.0)).unwrap(), Kind::Complex128, "(0+1i)")]
#[case(new_value(Duration::from_nanos(3_723_500_000_000)).unwrap(), Kind::Duration, "1h2m3.5s")]
#[case(new_value(Some(Box::new(7_u8))).unwrap(), Kind::Uint8, "7")]
#[case(new_value(None::<&str>).unwrap(), Kind::Invalid, "nil")]
fn canonical_strings(#[case] v: Value, #[case] kind: Kind, #[case] text: &str) {
    assert_eq!(v.kind(), kind);
    assert_eq!(v.to_string(), text);
}

#[test]
fn negative_duration_reads_as_integers() {
    let v = new_value(Duration::from_nanos(-123_456)).unwrap();
    assert_eq!(v.as_str(), "-123.456µs");
    assert_eq!(v.as_int().unwrap(), -123_456);
    assert_eq!(v.as_int64().unwrap(), -123_456);
    assert_eq!(v.as_uint64().unwrap(), 18_446_744_073_709_428_160);
    assert_eq!(v.as_duration().unwrap(), Duration::from_nanos(-123_456));
}

#[test]
fn unsupported_inputs_are_invalid() {
    assert!(matches!(new_value(vec!["a"]), Err(ValueError::Invalid { .. })));
    assert!(matches!(new_value(()), Err(ValueError::Invalid { .. })));
    assert_eq!(kind_of(&[0_u8; 4]), Kind::Array);
}

#[test]
fn string_targets_keep_text() {
    let custom = new_value(Duration::from_nanos(90 * 1_000_000_000)).unwrap();
    let s = custom.clone_as(Kind::String).unwrap();
    assert_eq!(s.as_str(), "1m30s");
    assert_eq!(s.clone_as(Kind::Duration).unwrap(), custom);
    assert_eq!(s.as_duration().unwrap(), Duration::from_nanos(90_000_000_000));
}

#[test]
fn string_parse_failures_surface_kind() {
    let v = Value::from("999999999999999999999");
    assert!(v.as_int64().unwrap_err().is_range());
    assert_eq!(v.int64(), 0);
    assert!(Value::from("0x").as_int().unwrap_err().is_syntax());
    assert!(Value::from("0x10").as_int().is_ok());
}

// ============================================================================
// VARIABLES
// ============================================================================

#[test]
fn variables_from_strings() {
    let v = parse_variable_from_string("key=").unwrap();
    assert_eq!(v.name(), "key");
    assert_eq!(v.as_str(), "");
    assert_eq!(v.kind(), Kind::String);

    assert_eq!(parse_variable_from_string("=val"), Err(KeyError::Empty));
}

#[test]
fn boundary_constructors() {
    let v = new_variable("timeout", Duration::SECOND * 5, true).unwrap();
    assert_eq!(v.as_str(), "5s");
    assert!(v.is_read_only());

    let v = new_as("ratio", "0.25", false, Kind::Float32).unwrap();
    assert_eq!(v.as_float32().unwrap(), 0.25);
    assert!(matches!(new_as("r", "x", false, Kind::Float32), Err(Error::Value(_))));
}

// ============================================================================
// COLLECTIONS
// ============================================================================

#[test]
fn read_only_store_is_rejected() {
    let m = Map::new();
    m.store_read_only("x", "1", true).unwrap();
    let err = m.store("x", "2").unwrap_err();
    assert!(err.is_read_only());
    assert_eq!(m.load("x").0.as_str(), "1");
}

#[test]
fn text_and_json_agree() {
    let m = Map::from_text("name=demo\nport=8080\nverbose=true\n").unwrap();
    assert_eq!(
        m.to_json().unwrap(),
        r#"{"name":"demo","port":"8080","verbose":"true"}"#
    );

    let typed = Map::from_json(r#"{"name":"demo","port":8080,"verbose":true}"#).unwrap();
    assert_eq!(typed.to_key_val_lines(), m.to_key_val_lines());
    assert_eq!(typed.get("port").kind(), Kind::Int);
}

#[test]
fn snapshots_are_detached() {
    let m = Map::new();
    m.store("a", 1).unwrap();
    let snap = m.snapshot();
    m.store("b", 2).unwrap();
    assert_eq!(snap.keys(), vec!["a"]);
    assert_eq!(ReadOnlyMap::from_map(&m).len(), 2);
    assert_eq!(
        serde_json::to_string(&ReadOnlyMap::default()).unwrap(),
        "null"
    );
}
