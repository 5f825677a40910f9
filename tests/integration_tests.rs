//! Integration tests for csv-dialect

use csv_dialect::{
    Detector, Dialect, DoubleQuote, Error, LineTerminator, MalformedKind, Quoting, Reader,
    SampleSize, Writer,
};
use std::fs::File;
use std::io::Write;
use tempfile::NamedTempFile;

fn tricky_records() -> Vec<Vec<String>> {
    [
        vec!["plain", "with,comma", "with\"quote"],
        vec!["line\nbreak", "carriage\rreturn", "both\r\n"],
        vec!["", "", ""],
        vec!["ελληνικά", "日本語", "emoji 🦀"],
        vec!["back\\slash", "  padded  ", "'single'"],
        vec!["42", "-3.5e2", "not a number"],
    ]
    .into_iter()
    .map(|r| r.into_iter().map(String::from).collect())
    .collect()
}

fn write_all(dialect: &Dialect, records: &[Vec<String>]) -> Vec<u8> {
    let mut writer = Writer::with_dialect(Vec::new(), dialect.clone());
    writer.write_records(records).unwrap();
    writer.into_inner().unwrap()
}

fn read_all(dialect: &Dialect, bytes: &[u8]) -> Vec<Vec<String>> {
    Reader::with_dialect(bytes, dialect.clone())
        .read_all()
        .unwrap()
}

fn utf16le_with_bom(text: &str) -> Vec<u8> {
    let mut data = vec![0xFF, 0xFE];
    for unit in text.encode_utf16() {
        data.extend_from_slice(&unit.to_le_bytes());
    }
    data
}

#[test]
fn test_round_trip_every_quoting_mode() {
    let records = tricky_records();
    for quoting in [
        Quoting::All,
        Quoting::Minimal,
        Quoting::NonNumeric,
        Quoting::None,
    ] {
        for terminator in [LineTerminator::LF, LineTerminator::CRLF, LineTerminator::CR] {
            let dialect = Dialect::builder()
                .escape(Some('\\'))
                .quoting(quoting)
                .line_terminator(terminator)
                .build()
                .unwrap();
            let bytes = write_all(&dialect, &records);
            assert_eq!(
                read_all(&dialect, &bytes),
                records,
                "{quoting:?} / {terminator:?}"
            );
        }
    }
}

#[test]
fn test_round_trip_escaped_quotes() {
    let dialect = Dialect::builder()
        .delimiter(';')
        .quote('\'')
        .escape(Some('\\'))
        .double_quote(DoubleQuote::Off)
        .build()
        .unwrap();
    let records = vec![
        vec!["it's".to_string(), "a;b".to_string()],
        vec!["\\'".to_string(), "''".to_string()],
    ];
    let bytes = write_all(&dialect, &records);
    assert_eq!(bytes, b"'it\\'s';'a;b'\n'\\\\\\'';'\\'\\''\n");
    assert_eq!(read_all(&dialect, &bytes), records);
}

#[test]
fn test_round_trip_tab_dialect() {
    let dialect = Dialect::tsv();
    let records = vec![vec!["a\tb".to_string(), "c".to_string()]];
    let bytes = write_all(&dialect, &records);
    assert_eq!(bytes, b"\"a\tb\"\tc\n");
    assert_eq!(read_all(&dialect, &bytes), records);
}

#[test]
fn test_sole_empty_field_survives_round_trip() {
    let dialect = Dialect::default();
    let records = vec![
        vec!["a".to_string()],
        vec![String::new()],
        vec!["b".to_string()],
    ];
    let bytes = write_all(&dialect, &records);
    assert_eq!(bytes, b"a\n\"\"\nb\n");
    assert_eq!(read_all(&dialect, &bytes), records);
}

#[test]
fn test_reader_matches_csv_crate() {
    let mut oracle = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for record in tricky_records() {
        oracle.write_record(&record).unwrap();
    }
    let bytes = oracle.into_inner().unwrap();

    assert_eq!(read_all(&Dialect::default(), &bytes), tricky_records());
}

#[test]
fn test_writer_output_parses_with_csv_crate() {
    let bytes = write_all(&Dialect::default(), &tricky_records());

    let mut oracle = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(&bytes[..]);
    let parsed: Vec<Vec<String>> = oracle
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    assert_eq!(parsed, tricky_records());
}

#[test]
fn test_read_utf16_with_bom() {
    let data = utf16le_with_bom("name,city\r\nΣοφία,\"Αθήνα, GR\"\r\n");
    let dialect = Dialect::builder()
        .line_terminator(LineTerminator::CRLF)
        .build()
        .unwrap();

    let records = read_all(&dialect, &data);
    assert_eq!(records, vec![vec!["name", "city"], vec!["Σοφία", "Αθήνα, GR"]]);
}

#[test]
fn test_read_utf8_bom_is_stripped() {
    let mut data = vec![0xEF, 0xBB, 0xBF];
    data.extend_from_slice(b"id,name\n1,x\n");
    let records = read_all(&Dialect::default(), &data);
    assert_eq!(records[0], vec!["id", "name"]);
}

#[test]
fn test_invalid_utf8_is_an_encoding_error() {
    let mut reader = Reader::new(&b"ok,fine\nbad,\xFF\n"[..]);
    assert_eq!(reader.read().unwrap(), Some(vec!["ok".into(), "fine".into()]));
    match reader.read() {
        Err(Error::Encoding(e)) => assert_eq!(e.offset, 12),
        other => panic!("expected an encoding error, got {other:?}"),
    }
}

#[test]
fn test_unterminated_quote_reports_record_number() {
    let mut reader = Reader::new(&b"a,b\nc,\"d\n"[..]);
    let mut records = reader.records();
    assert!(records.next().unwrap().is_ok());
    match records.next() {
        Some(Err(Error::MalformedRecord { record, kind })) => {
            assert_eq!(record, 2);
            assert_eq!(kind, MalformedKind::UnterminatedQuote);
        }
        other => panic!("expected a malformed record, got {other:?}"),
    }
    assert!(records.next().is_none());
}

#[test]
fn test_detector_sniff_then_read() {
    let data = utf16le_with_bom("a;b;c\r\n1;2;3\r\n\"x;y\";z;w\r\n");
    let (dialect, mut reader) = Detector::new().sniff(&data[..]).unwrap();

    assert_eq!(dialect.delimiter(), ';');
    assert_eq!(dialect.line_terminator(), LineTerminator::CRLF);
    assert_eq!(
        reader.read_all().unwrap(),
        vec![vec!["a", "b", "c"], vec!["1", "2", "3"], vec!["x;y", "z", "w"]]
    );
}

#[test]
fn test_detector_with_small_sample() {
    let mut data = String::from("col1|col2|col3\n");
    for i in 0..1000 {
        data.push_str(&format!("{i}|value {i}|{}\n", i * 2));
    }
    let mut detector = Detector::new();
    detector.sample_size(SampleSize::Lines(5));

    let (dialect, mut reader) = detector.sniff(data.as_bytes()).unwrap();
    assert_eq!(dialect.delimiter(), '|');
    assert_eq!(reader.read_all().unwrap().len(), 1001);
}

#[test]
fn test_detected_dialect_round_trips_writer_output() {
    let dialect = Dialect::builder()
        .delimiter('\t')
        .line_terminator(LineTerminator::CR)
        .build()
        .unwrap();
    let records = vec![
        vec!["h1".to_string(), "h2".to_string()],
        vec!["v1".to_string(), "v2".to_string()],
        vec!["v3".to_string(), "v4".to_string()],
    ];
    let bytes = write_all(&dialect, &records);

    let detected = Detector::new().detect_dialect(&bytes).unwrap();
    assert_eq!(detected.delimiter(), '\t');
    assert_eq!(detected.line_terminator(), LineTerminator::CR);
    assert_eq!(read_all(&detected, &bytes), records);
}

#[test]
fn test_file_round_trip() {
    let temp = NamedTempFile::new().unwrap();
    let dialect = Dialect::builder()
        .delimiter('|')
        .quoting(Quoting::All)
        .line_terminator(LineTerminator::CRLF)
        .build()
        .unwrap();

    let mut writer = Writer::with_dialect(File::create(temp.path()).unwrap(), dialect.clone());
    writer.write_records(tricky_records()).unwrap();
    writer.flush().unwrap();
    drop(writer);

    let mut reader = Reader::with_dialect(File::open(temp.path()).unwrap(), dialect);
    assert_eq!(reader.read_all().unwrap(), tricky_records());
    assert_eq!(reader.records_read(), tricky_records().len() as u64);
}

#[test]
fn test_detect_file_with_reader_variants() {
    let mut temp = NamedTempFile::new().unwrap();
    temp.write_all(b"x;y;z\n1;2;3\n4;5;6\n").unwrap();
    temp.flush().unwrap();

    let detector = Detector::new();
    let file = File::open(temp.path()).unwrap();
    assert_eq!(detector.detect_delimiter_in(file, '"'), Some(';'));
    let file = File::open(temp.path()).unwrap();
    assert_eq!(detector.detect_terminator_in(file), Some(LineTerminator::LF));
}

#[test]
fn test_invalid_dialects_are_rejected() {
    assert!(Dialect::builder().delimiter('"').build().is_err());
    assert!(Dialect::builder().delimiter('\n').build().is_err());
    assert!(Dialect::builder().quoting(Quoting::None).build().is_err());
    assert!(
        Dialect::builder()
            .double_quote(DoubleQuote::Off)
            .build()
            .unwrap_err()
            .is_config()
    );
}
