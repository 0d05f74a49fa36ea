//! End-to-end Timer header decoding through the public API

mod common;

use std::io::Cursor;
use std::sync::Arc;

use anyhow::{Context, Result};
use simplerm::timer::{
    BUILTIN_DEFINITION, SchemaCache, SchemaSource, TimerReader, decode_record, interpret,
    parse_definition,
};
use simplerm::{DecodeError, Position, RmError, SchemaError};

#[test]
fn shipped_layout_decodes_equatorial_header() -> Result<()> {
    let schema = SchemaCache::global().get(&SchemaSource::Builtin)?;
    let data = common::encode(&schema, &common::header_values("05"));

    let reader = TimerReader::from_bytes(&data).context("decoding synthetic header")?;
    let header = reader.header();
    assert_eq!(header.telescope, "Effelsberg");
    assert_eq!(header.name, "B1937+21");
    assert_eq!(header.mjd, 59000.5);
    assert_eq!(header.duration_seconds, 360.0);
    assert_eq!(header.position, Some(Position::Equatorial { ra_rad: 5.14, dec_rad: 0.38 }));
    Ok(())
}

#[test]
fn galactic_and_unknown_discriminators() -> Result<()> {
    let schema = SchemaCache::global().get(&SchemaSource::Builtin)?;

    let galactic = common::encode(&schema, &common::header_values("04"));
    let header = TimerReader::from_bytes(&galactic)?.into_header();
    assert_eq!(header.position, Some(Position::Galactic { l_deg: 57.5, b_deg: -0.29 }));

    let unknown = common::encode(&schema, &common::header_values("99"));
    let header = TimerReader::from_bytes(&unknown)?.into_header();
    assert_eq!(header.position, None);
    Ok(())
}

#[test]
fn decoder_consumes_exactly_the_schema_length() -> Result<()> {
    let schema = parse_definition(BUILTIN_DEFINITION)?;
    let mut data = common::encode(&schema, &common::header_values("05"));
    data.extend_from_slice(b"profile data that must not be read");

    let mut cursor = Cursor::new(data);
    let record = decode_record(&schema, &mut cursor)?;
    assert_eq!(cursor.position() as usize, schema.record_size());
    assert_eq!(record.len(), schema.len());
    interpret(&record)?;
    Ok(())
}

#[test]
fn truncated_header_gives_no_summary() -> Result<()> {
    let schema = SchemaCache::global().get(&SchemaSource::Builtin)?;
    let data = common::encode(&schema, &common::header_values("05"));

    for cut in [0, 1, 72, 137, schema.record_size() - 1] {
        let err = TimerReader::from_bytes(&data[..cut]).unwrap_err();
        assert!(
            matches!(err, RmError::Decode(DecodeError::Truncated { .. })),
            "cut at {cut}: {err}"
        );
    }
    Ok(())
}

#[test]
fn custom_definition_file_drives_the_layout() -> Result<()> {
    let definition = "\
/* trimmed-down layout */
#define NAME_LEN 12
struct timer {
  char psrname[NAME_LEN];
  char telid[NAME_LEN];
  int mjd;
  float fracmjd;
  int nsub_int;
  float sub_int_time;
  char coord_type[NAME_LEN];
};
";
    let definition_path = common::temp_path("definition.h");
    std::fs::write(&definition_path, definition)?;
    let source = SchemaSource::File(definition_path.clone());
    let schema = SchemaCache::global().get(&source)?;
    assert_eq!(schema.record_size(), 12 * 3 + 4 * 4);

    let record_path = common::temp_path("custom.timer");

    // Only the members of the selected coordinate system are needed
    std::fs::write(&record_path, common::encode(&schema, &common::header_values("99")))?;
    let header = TimerReader::open_with_source(&record_path, &source)?.into_header();
    assert_eq!(header.mjd, 59000.5);
    assert_eq!(header.position, None);

    for coord_type in ["04", "05"] {
        std::fs::write(&record_path, common::encode(&schema, &common::header_values(coord_type)))?;
        let err = TimerReader::open_with_schema(&record_path, Arc::clone(&schema)).unwrap_err();
        assert!(matches!(err, RmError::Interpret(_)), "{coord_type}: {err}");
    }

    std::fs::remove_file(definition_path).ok();
    std::fs::remove_file(record_path).ok();
    Ok(())
}

#[test]
fn lenient_lines_and_fatal_errors() {
    let clean = "#define N 4\nchar telid[N];\nint mjd;\n";
    let noisy = "#define N 4\nchar telid[N];\n}\nint mjd;\n";
    assert_eq!(parse_definition(clean).unwrap(), parse_definition(noisy).unwrap());

    assert!(matches!(
        parse_definition("char telid[M];"),
        Err(SchemaError::UndefinedLength { line: 1, .. })
    ));
    assert!(matches!(
        parse_definition("long mjd;"),
        Err(SchemaError::UnknownType { line: 1, .. })
    ));
}
