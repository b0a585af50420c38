use indexmap::IndexMap;

use crate::error::Error;
use crate::nbt;
use crate::test::Builder;
use crate::value::Value;
use crate::{NbtKit, TagKind};

fn sample() -> Vec<u8> {
    Builder::new()
        .start_compound("")
        .start_compound("Data")
        .byte("Difficulty", 1)
        .long("LastPlayed", 1687182273928)
        .double("BorderDamagePerBlock", 0.2)
        .string("LevelName", "world")
        .start_list("ServerBrands", TagKind::String, 1)
        .string_payload("Paper")
        .long_array("Heights", &[4, 5, 6])
        .end_compound()
        .end_compound()
        .build()
}

#[test]
fn any_decode_preserves_kinds() {
    let value: Value = NbtKit::new().from_bytes(&sample()).unwrap();

    let data = value.get("Data").expect("Data child");

    // kinds survive, down to the integer widths
    assert_eq!(data.get("Difficulty"), Some(&Value::Byte(1)));
    assert_eq!(data.get("LastPlayed"), Some(&Value::Long(1687182273928)));
    assert_eq!(
        data.get("BorderDamagePerBlock"),
        Some(&Value::Double(0.2))
    );
    assert_eq!(
        data.get("LevelName"),
        Some(&Value::String("world".to_owned()))
    );
    assert_eq!(
        data.get("ServerBrands"),
        Some(&Value::List(vec![Value::String("Paper".to_owned())]))
    );
    assert_eq!(
        data.get("Heights"),
        Some(&Value::LongArray(vec![4, 5, 6].into()))
    );
}

#[test]
fn any_round_trip_is_byte_identical() {
    let kit = NbtKit::new();
    let bytes = sample();
    let value: Value = kit.from_bytes(&bytes).unwrap();
    assert_eq!(kit.to_bytes(&value).unwrap(), bytes);
}

#[test]
fn compounds_keep_insertion_order() {
    let kit = NbtKit::new();
    let mut map = IndexMap::new();
    map.insert("z".to_owned(), Value::Int(1));
    map.insert("a".to_owned(), Value::Int(2));
    map.insert("m".to_owned(), Value::Int(3));
    let bytes = kit.to_bytes(&Value::Compound(map)).unwrap();

    let expected = Builder::new()
        .start_compound("")
        .int("z", 1)
        .int("a", 2)
        .int("m", 3)
        .end_compound()
        .build();
    assert_eq!(bytes, expected);
}

#[test]
fn empty_lists_write_the_end_kind() {
    let kit = NbtKit::new();
    let mut map = IndexMap::new();
    map.insert("xs".to_owned(), Value::List(vec![]));
    let bytes = kit.to_bytes(&Value::Compound(map)).unwrap();

    let expected = Builder::new()
        .start_compound("")
        .start_list("xs", TagKind::End, 0)
        .end_compound()
        .build();
    assert_eq!(bytes, expected);
}

#[test]
fn mixed_kind_lists_are_rejected() {
    let kit = NbtKit::new();
    let list = Value::List(vec![Value::Int(1), Value::Long(2)]);
    assert!(matches!(
        kit.to_bytes(&list),
        Err(Error::CorruptData(_))
    ));
}

#[test]
fn values_report_their_kind() {
    assert_eq!(Value::from(1i8).kind(), TagKind::Byte);
    assert_eq!(Value::from("x").kind(), TagKind::String);
    assert_eq!(Value::List(vec![]).kind(), TagKind::List);
    assert_eq!(Value::Compound(IndexMap::new()).kind(), TagKind::Compound);
}

#[test]
fn accessors_match_their_kind() {
    assert_eq!(Value::Byte(3).as_i64(), Some(3));
    assert_eq!(Value::Long(-9).as_i64(), Some(-9));
    assert_eq!(Value::Float(0.5).as_f64(), Some(0.5));
    assert_eq!(Value::Int(1).as_f64(), None);
    assert_eq!(Value::from("hi").as_str(), Some("hi"));
    assert!(Value::List(vec![Value::Byte(1)]).as_list().is_some());
    assert!(Value::Byte(1).as_compound().is_none());
}

#[test]
fn the_nbt_macro_builds_whole_trees() {
    let built = nbt!({
        "Difficulty": 1i8,
        "LastPlayed": 1687182273928i64,
        "BorderDamagePerBlock": 0.2,
        "LevelName": "world",
        "ServerBrands": ["Paper"],
        "Heights": [L; 4, 5, 6],
    });

    let parsed: Value = NbtKit::new()
        .from_bytes(&sample())
        .map(|v: Value| v.get("Data").cloned().unwrap())
        .unwrap();
    assert_eq!(built, parsed);
}

#[test]
fn the_nbt_macro_covers_every_bracket_form() {
    let value = nbt!({
        "empty": [],
        "bytes": [B; 1, 2],
        "ints": [I;],
        "nested": [{"x": 1}, {"x": 2}],
    });

    assert_eq!(value.get("empty"), Some(&Value::List(vec![])));
    assert_eq!(
        value.get("bytes"),
        Some(&Value::ByteArray(vec![1, 2].into()))
    );
    assert_eq!(value.get("ints"), Some(&Value::IntArray(vec![].into())));
    assert_eq!(
        value.get("nested").and_then(Value::as_list).map(|l| l.len()),
        Some(2)
    );
}
