//! Column Tests
//!
//! Per-type load/save contracts, the enum dispatch, the type registry,
//! and block framing.

use colwire::codec::{CodedReader, CodedWriter};
use colwire::column::{Column, FixedStringColumn, NumericColumn, StringColumn, TypeRegistry};
use colwire::io::ArrayReader;
use colwire::{Block, BlockInfo, ColwireError};

fn reader(bytes: &[u8]) -> CodedReader<ArrayReader<'_>> {
    CodedReader::new(ArrayReader::new(bytes))
}

fn save_to_vec(column: &Column) -> Vec<u8> {
    let mut out = Vec::new();
    let mut writer = CodedWriter::new(&mut out);
    column.save(&mut writer).unwrap();
    out
}

// =============================================================================
// Numeric Column Tests
// =============================================================================

#[test]
fn test_numeric_load_u64() {
    let mut wire = Vec::new();
    for v in [1u64, 2, 3] {
        wire.extend_from_slice(&v.to_le_bytes());
    }
    let mut column = Column::Numeric(NumericColumn::with_width(8));
    column.load(&mut reader(&wire), 3).unwrap();

    assert_eq!(column.len(), 3);
    let numeric = column.as_numeric().unwrap();
    assert_eq!(numeric.u64_at(0), Some(1));
    assert_eq!(numeric.u64_at(1), Some(2));
    assert_eq!(numeric.u64_at(2), Some(3));
    assert_eq!(numeric.u64_at(3), None);
}

#[test]
fn test_numeric_load_short_input_fails() {
    let wire = [0u8; 23]; // one byte short of 3 u64 rows
    let mut column = Column::Numeric(NumericColumn::with_width(8));
    assert!(column.load(&mut reader(&wire), 3).is_err());
}

#[test]
fn test_numeric_save_is_raw_little_endian() {
    let column = Column::Numeric(NumericColumn::from_u64s(&[1, 0x0100]));
    let wire = save_to_vec(&column);
    assert_eq!(wire[..8], [1, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(wire[8..], [0, 1, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_numeric_sign_extension() {
    // -1i16 and -2i16 on the wire.
    let wire = [0xFF, 0xFF, 0xFE, 0xFF];
    let mut column = NumericColumn::with_width(2);
    column.load(&mut reader(&wire), 2).unwrap();
    assert_eq!(column.i64_at(0), Some(-1));
    assert_eq!(column.i64_at(1), Some(-2));
    assert_eq!(column.u64_at(0), Some(0xFFFF));
}

#[test]
fn test_numeric_float_views() {
    let mut wire = Vec::new();
    wire.extend_from_slice(&1.5f32.to_le_bytes());
    let mut col32 = NumericColumn::with_width(4);
    col32.load(&mut reader(&wire), 1).unwrap();
    assert_eq!(col32.f64_at(0), Some(1.5));

    let mut wire = Vec::new();
    wire.extend_from_slice(&(-2.25f64).to_le_bytes());
    let mut col64 = NumericColumn::with_width(8);
    col64.load(&mut reader(&wire), 1).unwrap();
    assert_eq!(col64.f64_at(0), Some(-2.25));

    let col16 = NumericColumn::with_width(2);
    assert_eq!(col16.f64_at(0), None);
}

#[test]
fn test_numeric_append_and_slice() {
    let mut column = NumericColumn::from_u64s(&[1, 2, 3]);
    column.append(&NumericColumn::from_u64s(&[4, 5])).unwrap();
    assert_eq!(column.len(), 5);

    let middle = column.slice(1, 3).unwrap();
    assert_eq!(middle.len(), 3);
    assert_eq!(middle.u64_at(0), Some(2));
    assert_eq!(middle.u64_at(2), Some(4));

    assert!(column.slice(3, 3).is_err());
    assert!(column.append(&NumericColumn::with_width(4)).is_err());
}

// =============================================================================
// String Column Tests
// =============================================================================

#[test]
fn test_string_load_and_save() {
    let wire = [0x03, b'f', b'o', b'o', 0x00, 0x02, b'h', b'i'];
    let mut column = Column::String(StringColumn::new());
    column.load(&mut reader(&wire), 3).unwrap();

    assert_eq!(column.len(), 3);
    let strings = column.as_string().unwrap();
    assert_eq!(strings.at(0), Some(&b"foo"[..]));
    assert_eq!(strings.at(1), Some(&b""[..]));
    assert_eq!(strings.at(2), Some(&b"hi"[..]));

    assert_eq!(save_to_vec(&column), wire);
}

#[test]
fn test_string_load_truncated_fails() {
    // Second row declares 4 bytes, only 1 remains.
    let wire = [0x01, b'a', 0x04, b'b'];
    let mut column = Column::String(StringColumn::new());
    assert!(column.load(&mut reader(&wire), 2).is_err());
}

#[test]
fn test_string_append_slice_clear() {
    let mut column = StringColumn::from_strs(&["a", "b", "c"]);
    column.append(&StringColumn::from_strs(&["d"]));
    assert_eq!(column.len(), 4);

    let tail = column.slice(2, 2).unwrap();
    assert_eq!(tail.at(0), Some(&b"c"[..]));
    assert_eq!(tail.at(1), Some(&b"d"[..]));
    assert!(column.slice(4, 1).is_err());

    column.clear();
    assert!(column.is_empty());
}

// =============================================================================
// Fixed String Column Tests
// =============================================================================

#[test]
fn test_fixed_string_load_and_at() {
    let mut column = FixedStringColumn::with_size(3);
    column.load(&mut reader(b"abcdef"), 2).unwrap();
    assert_eq!(column.len(), 2);
    assert_eq!(column.at(0), Some(&b"abc"[..]));
    assert_eq!(column.at(1), Some(&b"def"[..]));
    assert_eq!(column.at(2), None);

    let mut short = FixedStringColumn::with_size(3);
    assert!(short.load(&mut reader(b"abcde"), 2).is_err());
}

#[test]
fn test_fixed_string_push_pads_and_rejects() {
    let mut column = FixedStringColumn::with_size(4);
    column.push(b"ab").unwrap();
    assert_eq!(column.at(0), Some(&b"ab\0\0"[..]));
    assert!(column.push(b"toolong").is_err());
}

#[test]
fn test_fixed_string_append_and_slice() {
    let mut column = FixedStringColumn::with_size(2);
    column.load(&mut reader(b"aabbcc"), 3).unwrap();

    let mut other = FixedStringColumn::with_size(2);
    other.load(&mut reader(b"dd"), 1).unwrap();
    column.append(&other).unwrap();
    assert_eq!(column.len(), 4);

    let piece = column.slice(1, 2).unwrap();
    assert_eq!(piece.at(0), Some(&b"bb"[..]));
    assert_eq!(piece.at(1), Some(&b"cc"[..]));

    assert!(column.append(&FixedStringColumn::with_size(3)).is_err());
}

// =============================================================================
// Enum Dispatch Tests
// =============================================================================

#[test]
fn test_cross_type_append_is_rejected() {
    let mut numeric = Column::Numeric(NumericColumn::from_u64s(&[1]));
    let strings = Column::String(StringColumn::from_strs(&["a"]));
    assert!(matches!(
        numeric.append(&strings),
        Err(ColwireError::Column(_))
    ));
}

#[test]
fn test_dispatch_clear_and_slice() {
    let mut column = Column::Numeric(NumericColumn::from_u64s(&[1, 2, 3]));
    let sliced = column.slice(0, 2).unwrap();
    assert_eq!(sliced.len(), 2);
    column.clear();
    assert!(column.is_empty());
}

// =============================================================================
// Type Registry Tests
// =============================================================================

#[test]
fn test_registry_resolves_builtin_widths() {
    let registry = TypeRegistry::new();
    for (name, width) in [
        ("UInt8", 1),
        ("Int16", 2),
        ("UInt32", 4),
        ("Int64", 8),
        ("Float32", 4),
        ("Float64", 8),
    ] {
        match registry.resolve(name).unwrap() {
            Column::Numeric(c) => assert_eq!(c.width(), width, "{}", name),
            other => panic!("{} resolved to a {:?}", name, other),
        }
    }
    assert!(matches!(
        registry.resolve("String").unwrap(),
        Column::String(_)
    ));
}

#[test]
fn test_registry_parses_fixed_string() {
    let registry = TypeRegistry::new();
    match registry.resolve("FixedString(16)").unwrap() {
        Column::FixedString(c) => assert_eq!(c.fixed_size(), 16),
        other => panic!("resolved to a {:?}", other),
    }
    assert!(registry.resolve("FixedString(0)").is_err());
}

#[test]
fn test_registry_unknown_type_is_hard_error() {
    let registry = TypeRegistry::new();
    for name in ["DateTime64(3)", "Array(UInt8)", "", "uint64"] {
        assert!(
            matches!(
                registry.resolve(name),
                Err(ColwireError::UnimplementedType(_))
            ),
            "{:?} should be unimplemented",
            name
        );
    }
}

#[test]
fn test_registry_custom_registration() {
    let mut registry = TypeRegistry::new();
    registry.register("Date", || Column::Numeric(NumericColumn::with_width(2)));
    match registry.resolve("Date").unwrap() {
        Column::Numeric(c) => assert_eq!(c.width(), 2),
        other => panic!("resolved to a {:?}", other),
    }
}

// =============================================================================
// Block Tests
// =============================================================================

#[test]
fn test_block_row_count_invariant() {
    let mut block = Block::new();
    block
        .append_column("a", "UInt64", Column::Numeric(NumericColumn::from_u64s(&[1, 2])))
        .unwrap();
    let err = block.append_column(
        "b",
        "UInt64",
        Column::Numeric(NumericColumn::from_u64s(&[1])),
    );
    assert!(matches!(err, Err(ColwireError::Block(_))));
    assert_eq!(block.column_count(), 1);
    assert_eq!(block.row_count(), 2);
}

#[test]
fn test_block_save_load_mirror() {
    let mut block = Block::new();
    block
        .append_column(
            "id",
            "UInt64",
            Column::Numeric(NumericColumn::from_u64s(&[10, 20])),
        )
        .unwrap();
    block
        .append_column(
            "name",
            "String",
            Column::String(StringColumn::from_strs(&["ten", "twenty"])),
        )
        .unwrap();

    let mut wire = Vec::new();
    let mut writer = CodedWriter::new(&mut wire);
    block.save(&mut writer).unwrap();

    let registry = TypeRegistry::new();
    let loaded = Block::load(&mut reader(&wire), &registry).unwrap();
    assert_eq!(loaded.row_count(), 2);
    assert_eq!(loaded.column_count(), 2);
    assert_eq!(loaded.name(0), Some("id"));
    assert_eq!(loaded.type_name(1), Some("String"));
    assert_eq!(loaded.column(0).unwrap().as_numeric().unwrap().u64_at(1), Some(20));
    assert_eq!(
        loaded.column(1).unwrap().as_string().unwrap().at(0),
        Some(&b"ten"[..])
    );
}

#[test]
fn test_block_zero_rows_skips_column_bodies() {
    // Column count 1, row count 0, then just name and type; no row data.
    let mut wire = Vec::new();
    let mut writer = CodedWriter::new(&mut wire);
    writer.write_varint64(1).unwrap();
    writer.write_varint64(0).unwrap();
    writer.write_string(b"x").unwrap();
    writer.write_string(b"UInt64").unwrap();

    let registry = TypeRegistry::new();
    let block = Block::load(&mut reader(&wire), &registry).unwrap();
    assert_eq!(block.row_count(), 0);
    assert_eq!(block.column_count(), 1);
}

#[test]
fn test_block_unknown_type_fails_even_with_zero_rows() {
    let mut wire = Vec::new();
    let mut writer = CodedWriter::new(&mut wire);
    writer.write_varint64(1).unwrap();
    writer.write_varint64(0).unwrap();
    writer.write_string(b"x").unwrap();
    writer.write_string(b"Mystery").unwrap();

    let registry = TypeRegistry::new();
    assert!(matches!(
        Block::load(&mut reader(&wire), &registry),
        Err(ColwireError::UnimplementedType(_))
    ));
}

#[test]
fn test_block_info_wire_image() {
    let info = BlockInfo {
        is_overflows: true,
        bucket_num: -1,
    };
    let mut wire = Vec::new();
    let mut writer = CodedWriter::new(&mut wire);
    info.save(&mut writer).unwrap();
    assert_eq!(wire, [0x01, 0x01, 0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0x00]);

    let loaded = BlockInfo::load(&mut reader(&wire)).unwrap();
    assert_eq!(loaded, info);
}
