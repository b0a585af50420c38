use crate::error::Error;
use crate::reader::{NbtReader, UNKNOWN_NAME};
use crate::test::Builder;
use crate::TagKind;

/// A document shaped like the interesting parts of a level.dat.
fn sample_level() -> Vec<u8> {
    Builder::new()
        .start_compound("")
        .start_compound("Data")
        .byte("Difficulty", 1)
        .int("thunderTime", 51264)
        .double("BorderSize", 1000.0)
        .long("LastPlayed", 1687182273928)
        .int("version", 19133)
        .start_list("ServerBrands", TagKind::String, 1)
        .string_payload("Paper")
        .float("SpawnAngle", 0.0)
        .string("LevelName", "world")
        .start_list("ScheduledEvents", TagKind::Compound, 0)
        .start_compound("WorldGenSettings")
        .byte("generate_features", 1)
        .long("seed", -6450009625622499088)
        .end_compound()
        .int("rainTime", 14590)
        .end_compound() // Data
        .end_compound() // root
        .build()
}

#[test]
fn root_is_lazily_peeked_and_named() {
    let data = sample_level();
    let mut reader = NbtReader::new(&data[..]);

    assert_eq!(reader.peek().unwrap(), TagKind::Compound);
    assert_eq!(reader.name().unwrap(), "");
    reader.begin_compound().unwrap();

    assert_eq!(reader.peek().unwrap(), TagKind::Compound);
    assert_eq!(reader.name().unwrap(), "Data");
}

#[test]
fn traverses_the_whole_document() {
    let data = sample_level();
    let mut reader = NbtReader::new(&data[..]);

    reader.begin_compound().unwrap();
    reader.begin_compound().unwrap();

    assert_eq!(reader.name().unwrap(), "Difficulty");
    assert_eq!(reader.peek().unwrap(), TagKind::Byte);
    assert_eq!(reader.next_i8().unwrap(), 1);

    assert_eq!(reader.name().unwrap(), "thunderTime");
    assert_eq!(reader.next_i32().unwrap(), 51264);

    assert_eq!(reader.name().unwrap(), "BorderSize");
    assert_eq!(reader.next_f64().unwrap(), 1000.0);

    assert_eq!(reader.name().unwrap(), "LastPlayed");
    assert_eq!(reader.next_i64().unwrap(), 1687182273928);

    assert_eq!(reader.name().unwrap(), "version");
    assert_eq!(reader.next_i32().unwrap(), 19133);

    assert_eq!(reader.name().unwrap(), "ServerBrands");
    assert_eq!(reader.begin_list().unwrap(), 1);
    assert_eq!(reader.peek().unwrap(), TagKind::String);
    assert_eq!(reader.name().unwrap(), UNKNOWN_NAME);
    assert_eq!(reader.next_string().unwrap(), "Paper");
    assert_eq!(reader.peek().unwrap(), TagKind::End);
    reader.end_list().unwrap();

    assert_eq!(reader.name().unwrap(), "SpawnAngle");
    assert_eq!(reader.next_f32().unwrap(), 0.0);

    assert_eq!(reader.name().unwrap(), "LevelName");
    assert_eq!(reader.next_string().unwrap(), "world");

    // an empty list reads as element kind End, whatever it declares
    assert_eq!(reader.name().unwrap(), "ScheduledEvents");
    assert_eq!(reader.begin_list().unwrap(), 0);
    assert_eq!(reader.peek().unwrap(), TagKind::End);
    reader.end_list().unwrap();

    assert_eq!(reader.name().unwrap(), "WorldGenSettings");
    reader.begin_compound().unwrap();
    assert_eq!(reader.next_i8().unwrap(), 1);
    assert_eq!(reader.name().unwrap(), "seed");
    assert_eq!(reader.next_i64().unwrap(), -6450009625622499088);
    assert_eq!(reader.peek().unwrap(), TagKind::End);
    reader.end_compound().unwrap();

    assert_eq!(reader.name().unwrap(), "rainTime");
    assert_eq!(reader.next_i32().unwrap(), 14590);

    assert_eq!(reader.peek().unwrap(), TagKind::End);
    reader.end_compound().unwrap();
    assert_eq!(reader.peek().unwrap(), TagKind::End);
    reader.end_compound().unwrap();

    // the document is exhausted
    assert!(matches!(reader.peek(), Err(Error::UnexpectedEnd)));
}

#[test]
fn skip_passes_over_any_element() {
    let data = sample_level();
    let mut reader = NbtReader::new(&data[..]);

    reader.begin_compound().unwrap();
    reader.begin_compound().unwrap();

    for _ in 0..4 {
        reader.skip().unwrap();
    }
    assert_eq!(reader.name().unwrap(), "version");
    assert_eq!(reader.next_i32().unwrap(), 19133);

    reader.skip().unwrap(); // ServerBrands
    reader.skip().unwrap(); // SpawnAngle
    reader.skip().unwrap(); // LevelName
    reader.skip().unwrap(); // ScheduledEvents
    reader.skip().unwrap(); // WorldGenSettings

    assert_eq!(reader.name().unwrap(), "rainTime");
    assert_eq!(reader.peek().unwrap(), TagKind::Int);

    // skip the rest of Data and consume its End
    reader.skip_out(1).unwrap();
    assert_eq!(reader.peek().unwrap(), TagKind::End);
    reader.end_compound().unwrap();
}

#[test]
fn skip_and_read_land_in_the_same_place() {
    let data = Builder::new()
        .start_compound("")
        .start_list("values", TagKind::Double, 3)
        .double_payload(0.25)
        .double_payload(0.5)
        .double_payload(0.75)
        .int("after", 7)
        .end_compound()
        .build();

    let mut skipped = NbtReader::new(&data[..]);
    skipped.begin_compound().unwrap();
    skipped.skip().unwrap();

    let mut consumed = NbtReader::new(&data[..]);
    consumed.begin_compound().unwrap();
    consumed.begin_list().unwrap();
    while consumed.has_next().unwrap() {
        consumed.next_f64().unwrap();
    }
    consumed.end_list().unwrap();

    for reader in [&mut skipped, &mut consumed] {
        assert_eq!(reader.name().unwrap(), "after");
        assert_eq!(reader.next_i32().unwrap(), 7);
    }
}

#[test]
fn remaining_items_count_down() {
    let data = Builder::new()
        .start_compound("")
        .start_list("xs", TagKind::Int, 2)
        .int_payload(1)
        .int_payload(2)
        .end_compound()
        .build();

    let mut reader = NbtReader::new(&data[..]);
    reader.begin_compound().unwrap();
    assert!(!reader.in_list());
    assert!(reader.in_compound());

    reader.begin_list().unwrap();
    assert!(reader.in_list());
    assert_eq!(reader.remaining_list_items(), 2);
    reader.next_i32().unwrap();
    assert_eq!(reader.remaining_list_items(), 1);
    reader.next_i32().unwrap();
    assert_eq!(reader.remaining_list_items(), 0);
    reader.end_list().unwrap();
}

#[test]
fn cross_kind_array_reads_cast_elements() {
    let data = Builder::new()
        .start_compound("")
        .int_array("xs", &[1, -2, 300])
        .end_compound()
        .build();

    let mut reader = NbtReader::new(&data[..]);
    reader.begin_compound().unwrap();
    assert_eq!(reader.next_array_as_i64().unwrap(), vec![1, -2, 300]);
}

#[test]
fn paths_name_the_position() {
    let data = sample_level();
    let mut reader = NbtReader::new(&data[..]);

    reader.begin_compound().unwrap();
    assert_eq!(reader.name().unwrap(), "Data");
    reader.begin_compound().unwrap();
    reader.name().unwrap();
    assert_eq!(reader.path(), "Data.Difficulty");

    let err = reader.next_i32().unwrap_err();
    match err {
        Error::UnexpectedKind {
            expected,
            found,
            path,
        } => {
            assert_eq!(expected, TagKind::Int);
            assert_eq!(found, TagKind::Byte);
            assert_eq!(path, "Data.Difficulty");
        }
        other => panic!("expected UnexpectedKind, got {other:?}"),
    }
}

#[test]
fn invalid_tag_ids_are_rejected() {
    let data = Builder::new()
        .start_compound("")
        .raw_bytes(&[13])
        .build();

    let mut reader = NbtReader::new(&data[..]);
    reader.begin_compound().unwrap();
    assert!(matches!(reader.peek(), Err(Error::InvalidTagId(13))));
}

#[test]
fn truncation_is_an_unexpected_end() {
    let full = Builder::new()
        .start_compound("")
        .long("value", 123456789)
        .end_compound()
        .build();
    let cut = &full[..full.len() - 6];

    let mut reader = NbtReader::new(cut);
    reader.begin_compound().unwrap();
    assert!(matches!(reader.next_i64(), Err(Error::UnexpectedEnd)));
}

#[test]
fn negative_lengths_are_rejected() {
    let data = Builder::new()
        .start_compound("")
        .tag(TagKind::ByteArray)
        .name("xs")
        .int_payload(-1)
        .end_compound()
        .build();

    let mut reader = NbtReader::new(&data[..]);
    reader.begin_compound().unwrap();
    assert!(matches!(
        reader.next_byte_array(),
        Err(Error::NegativeLength(-1))
    ));
}

#[test]
fn nonempty_list_of_end_is_corrupt() {
    let data = Builder::new()
        .start_compound("")
        .start_list("xs", TagKind::End, 3)
        .end_compound()
        .build();

    let mut reader = NbtReader::new(&data[..]);
    reader.begin_compound().unwrap();
    assert!(matches!(reader.begin_list(), Err(Error::CorruptData(_))));
}

#[test]
fn ending_the_wrong_context_is_a_mismatch() {
    let data = Builder::new()
        .start_compound("")
        .start_list("xs", TagKind::Int, 1)
        .int_payload(5)
        .end_compound()
        .build();

    let mut reader = NbtReader::new(&data[..]);
    reader.begin_compound().unwrap();
    reader.begin_list().unwrap();
    reader.next_i32().unwrap();
    assert!(matches!(
        reader.end_compound(),
        Err(Error::ContextMismatch(_))
    ));
}

#[test]
fn modified_utf8_strings_survive() {
    // U+0000 and a supplementary-plane character, both encoded the
    // modified way
    let tricky = "nul:\u{0000} clef:\u{1D11E}";
    let data = Builder::new()
        .start_compound("")
        .string("s", tricky)
        .end_compound()
        .build();

    let mut reader = NbtReader::new(&data[..]);
    reader.begin_compound().unwrap();
    assert_eq!(reader.next_string().unwrap(), tricky);
}

#[test]
fn capture_raw_reproduces_the_element() {
    let data = sample_level();
    let mut reader = NbtReader::new(&data[..]);
    reader.begin_compound().unwrap();

    assert_eq!(reader.name().unwrap(), "Data");
    let raw = reader.capture_raw().unwrap();

    // the original reader has moved past the whole subtree
    assert_eq!(reader.peek().unwrap(), TagKind::End);

    // the captured bytes parse alone, with the name intact
    let mut reparsed = NbtReader::new(&raw[..]);
    assert_eq!(reparsed.peek().unwrap(), TagKind::Compound);
    assert_eq!(reparsed.name().unwrap(), "Data");
    reparsed.begin_compound().unwrap();
    assert_eq!(reparsed.name().unwrap(), "Difficulty");
    assert_eq!(reparsed.next_i8().unwrap(), 1);
}

#[test]
fn capture_raw_of_scalars_includes_the_payload() {
    let data = Builder::new()
        .start_compound("")
        .long("value", 77)
        .int("after", 1)
        .end_compound()
        .build();

    let mut reader = NbtReader::new(&data[..]);
    reader.begin_compound().unwrap();
    let raw = reader.capture_raw().unwrap();

    let expected = Builder::new().long("value", 77).build();
    assert_eq!(raw, expected);

    assert_eq!(reader.name().unwrap(), "after");
    assert_eq!(reader.next_i32().unwrap(), 1);
}

#[test]
fn capture_raw_inside_a_list_synthesizes_an_empty_name() {
    let data = Builder::new()
        .start_compound("")
        .start_list("xs", TagKind::Int, 2)
        .int_payload(4)
        .int_payload(5)
        .end_compound()
        .build();

    let mut reader = NbtReader::new(&data[..]);
    reader.begin_compound().unwrap();
    reader.begin_list().unwrap();
    let raw = reader.capture_raw().unwrap();
    assert_eq!(raw, Builder::new().int("", 4).build());

    assert_eq!(reader.next_i32().unwrap(), 5);
}

#[test]
fn skipping_an_end_tag_is_refused() {
    let data = Builder::new()
        .start_compound("")
        .end_compound()
        .build();

    let mut reader = NbtReader::new(&data[..]);
    reader.begin_compound().unwrap();
    assert_eq!(reader.peek().unwrap(), TagKind::End);
    assert!(matches!(reader.skip(), Err(Error::ContextMismatch(_))));
}
