//! Property tests: reading what the writer produced yields the same records.

use csv_dialect::{Dialect, DoubleQuote, LineTerminator, Quoting, Reader, Record, Writer};
use proptest::prelude::*;
use proptest::sample::select;

/// Fields drawn from text that is special in at least one dialect below.
fn field() -> impl Strategy<Value = String> {
    "[a-z0-9 ,;|\t\"'\\\\~§é.+\r\n-]{0,8}"
}

/// Records with at least one field each.
fn records() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(prop::collection::vec(field(), 1..6), 0..8)
}

fn quoting() -> impl Strategy<Value = Quoting> {
    select(vec![
        Quoting::All,
        Quoting::Minimal,
        Quoting::NonNumeric,
        Quoting::None,
    ])
}

fn terminator() -> impl Strategy<Value = LineTerminator> {
    select(vec![
        LineTerminator::LF,
        LineTerminator::CRLF,
        LineTerminator::CR,
    ])
}

proptest! {
    #[test]
    fn read_inverts_write(
        delimiter in select(vec![',', ';', '\t', '|', ' ', 'é']),
        quote in select(vec!['"', '\'', '§']),
        escape in select(vec![None, Some('\\'), Some('~')]),
        quoting in quoting(),
        double_quote in select(vec![DoubleQuote::On, DoubleQuote::Off]),
        terminator in terminator(),
        records in records(),
    ) {
        let mut builder = Dialect::builder();
        builder
            .delimiter(delimiter)
            .quote(quote)
            .escape(escape)
            .quoting(quoting)
            .double_quote(double_quote)
            .line_terminator(terminator);
        let dialect = builder.build();
        prop_assume!(dialect.is_ok());
        let dialect = dialect.unwrap();

        let mut writer = Writer::with_dialect(Vec::new(), dialect.clone());
        writer.write_records(&records).unwrap();
        let bytes = writer.into_inner().unwrap();

        let read = Reader::with_dialect(&bytes[..], dialect).read_all().unwrap();
        prop_assert_eq!(read, records);
    }

    #[test]
    fn default_dialect_round_trips(records in records()) {
        let mut writer = Writer::new(Vec::new());
        writer.write_records(&records).unwrap();
        let bytes = writer.into_inner().unwrap();

        prop_assert_eq!(Reader::new(&bytes[..]).read_all().unwrap(), records);
    }
}
