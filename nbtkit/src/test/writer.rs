use crate::error::Error;
use crate::reader::NbtReader;
use crate::test::Builder;
use crate::writer::NbtWriter;
use crate::TagKind;

#[test]
fn mixed_compound_round_trips_through_the_reader() {
    let mut out = Vec::new();
    let mut writer = NbtWriter::new(&mut out);

    assert!(!writer.in_compound());
    assert!(!writer.in_list());

    writer.begin_compound().unwrap();
    assert!(writer.in_compound());

    writer.name("testByte").unwrap().value_i8(10).unwrap();
    writer.name("testShort").unwrap().value_i16(-23).unwrap();
    writer.name("testInt").unwrap().value_i32(1034).unwrap();
    writer.name("testLong").unwrap().value_i64(289374678734).unwrap();
    writer.name("testFloat").unwrap().value_f32(-2.653).unwrap();
    writer.name("testDouble").unwrap().value_f64(4.653).unwrap();

    writer.name("testCompound").unwrap();
    writer.begin_compound().unwrap();

    writer.name("testList").unwrap();
    writer.begin_list(3).unwrap();
    assert!(writer.in_list());
    assert!(!writer.in_compound());
    writer.value_f64(0.43).unwrap();
    writer.value_f64(-0.43).unwrap();
    writer.value_f64(1.0).unwrap();
    writer.end_list().unwrap();

    writer
        .name("testByteArray")
        .unwrap()
        .value_byte_array(&[0, 110, 30, 20, 3, -4])
        .unwrap();
    writer
        .name("testIntArray")
        .unwrap()
        .value_int_array(&[0, -10342, 30, 20, 3, -4])
        .unwrap();
    writer
        .name("testLongArray")
        .unwrap()
        .value_long_array(&[0, 110, 289374678734, 20, 3, -4])
        .unwrap();

    writer.end_compound().unwrap(); // testCompound
    writer.end_compound().unwrap(); // root
    writer.finish().unwrap();

    let mut reader = NbtReader::new(&out[..]);
    reader.begin_compound().unwrap();

    assert_eq!(reader.peek().unwrap(), TagKind::Byte);
    assert_eq!(reader.name().unwrap(), "testByte");
    assert_eq!(reader.next_i8().unwrap(), 10);

    assert_eq!(reader.peek().unwrap(), TagKind::Short);
    assert_eq!(reader.name().unwrap(), "testShort");
    assert_eq!(reader.next_i16().unwrap(), -23);

    assert_eq!(reader.peek().unwrap(), TagKind::Int);
    assert_eq!(reader.name().unwrap(), "testInt");
    assert_eq!(reader.next_i32().unwrap(), 1034);

    assert_eq!(reader.peek().unwrap(), TagKind::Long);
    assert_eq!(reader.name().unwrap(), "testLong");
    assert_eq!(reader.next_i64().unwrap(), 289374678734);

    assert_eq!(reader.peek().unwrap(), TagKind::Float);
    assert_eq!(reader.name().unwrap(), "testFloat");
    assert_eq!(reader.next_f32().unwrap(), -2.653);

    assert_eq!(reader.peek().unwrap(), TagKind::Double);
    assert_eq!(reader.name().unwrap(), "testDouble");
    assert_eq!(reader.next_f64().unwrap(), 4.653);

    assert_eq!(reader.peek().unwrap(), TagKind::Compound);
    assert_eq!(reader.name().unwrap(), "testCompound");
    reader.begin_compound().unwrap();

    assert_eq!(reader.peek().unwrap(), TagKind::List);
    assert_eq!(reader.name().unwrap(), "testList");
    assert_eq!(reader.begin_list().unwrap(), 3);
    assert_eq!(reader.peek().unwrap(), TagKind::Double);
    assert_eq!(reader.next_f64().unwrap(), 0.43);
    assert_eq!(reader.next_f64().unwrap(), -0.43);
    assert_eq!(reader.next_f64().unwrap(), 1.0);
    assert_eq!(reader.peek().unwrap(), TagKind::End);
    reader.end_list().unwrap();

    assert_eq!(reader.name().unwrap(), "testByteArray");
    assert_eq!(reader.next_byte_array().unwrap(), vec![0, 110, 30, 20, 3, -4]);

    assert_eq!(reader.name().unwrap(), "testIntArray");
    assert_eq!(
        reader.next_int_array().unwrap(),
        vec![0, -10342, 30, 20, 3, -4]
    );

    assert_eq!(reader.name().unwrap(), "testLongArray");
    assert_eq!(
        reader.next_long_array().unwrap(),
        vec![0, 110, 289374678734, 20, 3, -4]
    );

    assert_eq!(reader.peek().unwrap(), TagKind::End);
    reader.end_compound().unwrap();
    assert_eq!(reader.peek().unwrap(), TagKind::End);
    reader.end_compound().unwrap();
}

#[test]
fn emits_the_exact_bytes() {
    let mut out = Vec::new();
    let mut writer = NbtWriter::new(&mut out);
    writer.begin_compound().unwrap();
    writer.name("score").unwrap().value_i32(17).unwrap();
    writer.name("motd").unwrap().value_str("hi").unwrap();
    writer.end_compound().unwrap();
    writer.finish().unwrap();

    let expected = Builder::new()
        .start_compound("")
        .int("score", 17)
        .string("motd", "hi")
        .end_compound()
        .build();
    assert_eq!(out, expected);
}

#[test]
fn list_header_carries_the_first_value_kind() {
    let mut out = Vec::new();
    let mut writer = NbtWriter::new(&mut out);
    writer.begin_compound().unwrap();
    writer.name("xs").unwrap();
    writer.begin_list(2).unwrap();
    writer.value_i16(1).unwrap();
    writer.value_i16(2).unwrap();
    writer.end_list().unwrap();
    writer.end_compound().unwrap();
    writer.finish().unwrap();

    let expected = Builder::new()
        .start_compound("")
        .start_list("xs", TagKind::Short, 2)
        .short_payload(1)
        .short_payload(2)
        .end_compound()
        .build();
    assert_eq!(out, expected);
}

#[test]
fn empty_typed_list_writes_its_header_immediately() {
    let mut out = Vec::new();
    let mut writer = NbtWriter::new(&mut out);
    writer.begin_compound().unwrap();
    writer.name("ScheduledEvents").unwrap();
    writer.begin_list_of(TagKind::Compound, 0).unwrap();
    writer.end_list().unwrap();
    writer.end_compound().unwrap();
    writer.finish().unwrap();

    let expected = Builder::new()
        .start_compound("")
        .start_list("ScheduledEvents", TagKind::Compound, 0)
        .end_compound()
        .build();
    assert_eq!(out, expected);

    let mut reader = NbtReader::new(&out[..]);
    reader.begin_compound().unwrap();
    assert_eq!(reader.name().unwrap(), "ScheduledEvents");
    assert_eq!(reader.begin_list().unwrap(), 0);
    assert_eq!(reader.peek().unwrap(), TagKind::End);
    reader.end_list().unwrap();
    reader.end_compound().unwrap();
}

#[test]
fn lists_of_compounds_write_one_header() {
    let mut out = Vec::new();
    let mut writer = NbtWriter::new(&mut out);
    writer.begin_compound().unwrap();
    writer.name("entries").unwrap();
    writer.begin_list(2).unwrap();
    for id in [1, 2] {
        writer.begin_compound().unwrap();
        writer.name("id").unwrap().value_i32(id).unwrap();
        writer.end_compound().unwrap();
    }
    writer.end_list().unwrap();
    writer.end_compound().unwrap();
    writer.finish().unwrap();

    let expected = Builder::new()
        .start_compound("")
        .start_list("entries", TagKind::Compound, 2)
        .start_anon_compound()
        .int("id", 1)
        .end_compound()
        .start_anon_compound()
        .int("id", 2)
        .end_compound()
        .end_compound()
        .build();
    assert_eq!(out, expected);
}

#[test]
fn root_values_default_to_the_empty_name() {
    let mut out = Vec::new();
    let mut writer = NbtWriter::new(&mut out);
    writer.begin_compound().unwrap();
    writer.end_compound().unwrap();
    writer.finish().unwrap();
    assert_eq!(out, vec![10, 0, 0, 0]);
}

#[test]
fn empty_untyped_lists_are_refused() {
    let mut out = Vec::new();
    let mut writer = NbtWriter::new(&mut out);
    writer.begin_compound().unwrap();
    writer.name("xs").unwrap();
    assert!(matches!(
        writer.begin_list(0),
        Err(Error::ContextMismatch(_))
    ));
}

#[test]
fn values_in_compounds_need_names() {
    let mut out = Vec::new();
    let mut writer = NbtWriter::new(&mut out);
    writer.begin_compound().unwrap();
    assert!(matches!(
        writer.value_i32(1),
        Err(Error::NameOutOfPlace(_))
    ));
}

#[test]
fn names_in_lists_are_refused() {
    let mut out = Vec::new();
    let mut writer = NbtWriter::new(&mut out);
    writer.begin_compound().unwrap();
    writer.name("xs").unwrap();
    writer.begin_list(2).unwrap();
    writer.name("first").unwrap();
    assert!(matches!(
        writer.value_i32(1),
        Err(Error::NameOutOfPlace(_))
    ));
}

#[test]
fn double_names_are_refused() {
    let mut out = Vec::new();
    let mut writer = NbtWriter::new(&mut out);
    writer.begin_compound().unwrap();
    writer.name("a").unwrap();
    assert!(matches!(writer.name("b"), Err(Error::NameOutOfPlace(_))));
}

#[test]
fn list_values_must_share_one_kind() {
    let mut out = Vec::new();
    let mut writer = NbtWriter::new(&mut out);
    writer.begin_compound().unwrap();
    writer.name("xs").unwrap();
    writer.begin_list(2).unwrap();
    writer.value_i32(1).unwrap();
    assert!(matches!(
        writer.value_i64(2),
        Err(Error::ContextMismatch(_))
    ));
}

#[test]
fn overfilled_lists_are_refused() {
    let mut out = Vec::new();
    let mut writer = NbtWriter::new(&mut out);
    writer.begin_compound().unwrap();
    writer.name("xs").unwrap();
    writer.begin_list(1).unwrap();
    writer.value_i32(1).unwrap();
    assert!(matches!(
        writer.value_i32(2),
        Err(Error::ContextMismatch(_))
    ));
}

#[test]
fn short_lists_can_not_be_closed() {
    let mut out = Vec::new();
    let mut writer = NbtWriter::new(&mut out);
    writer.begin_compound().unwrap();
    writer.name("xs").unwrap();
    writer.begin_list(2).unwrap();
    writer.value_i32(1).unwrap();
    assert!(matches!(writer.end_list(), Err(Error::ContextMismatch(_))));
}

#[test]
fn closing_the_wrong_context_is_refused() {
    let mut out = Vec::new();
    let mut writer = NbtWriter::new(&mut out);
    writer.begin_compound().unwrap();
    assert!(matches!(writer.end_list(), Err(Error::ContextMismatch(_))));
}

#[test]
fn unfinished_documents_are_refused() {
    let mut out = Vec::new();
    let mut writer = NbtWriter::new(&mut out);
    writer.begin_compound().unwrap();
    writer.name("inner").unwrap();
    writer.begin_compound().unwrap();
    assert!(matches!(
        writer.finish(),
        Err(Error::IncompleteDocument(2))
    ));
}
