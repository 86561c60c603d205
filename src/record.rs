use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::TransformError;

/// Number of leading tokens every input line must provide.
pub const REQUIRED_TOKENS: usize = 4;

/// One input line reduced to the four tokens the output keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    first: String,
    second: String,
    third: String,
    fourth: String,
}

impl Record {
    pub fn new(
        first: impl Into<String>,
        second: impl Into<String>,
        third: impl Into<String>,
        fourth: impl Into<String>,
    ) -> Self {
        Record {
            first: first.into(),
            second: second.into(),
            third: third.into(),
            fourth: fourth.into(),
        }
    }

    /// Splits a line (terminator already removed) on commas. Tokens past the
    /// fourth are dropped. `line_no` is 1-based and only used for the error.
    pub fn parse(line: &str, line_no: usize) -> Result<Self, TransformError> {
        let tokens: Vec<&str> = line.split(',').collect();
        if tokens.len() < REQUIRED_TOKENS {
            return Err(TransformError::MalformedRecord {
                line: line_no,
                found: tokens.len(),
            });
        }
        Ok(Record::new(tokens[0], tokens[1], tokens[2], tokens[3]))
    }

    /// The first three tokens joined with `-`, in the order they appear.
    ///
    /// Input laid out as year,month,day therefore comes out as `YYYY-MM-DD`.
    /// No reordering into `DD/MM/YYYY` happens here, even though that is what
    /// the column was once meant to hold.
    pub fn derived(&self) -> String {
        format!("{}-{}-{}", self.first, self.second, self.third)
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Record", 5)?;
        state.serialize_field("first", &self.first)?;
        state.serialize_field("second", &self.second)?;
        state.serialize_field("third", &self.third)?;
        state.serialize_field("fourth", &self.fourth)?;
        state.serialize_field("derived", &self.derived())?;
        state.end()
    }
}

#[test]
fn parse_keeps_first_four_tokens() {
    let record = Record::parse("2020,01,15,100,extra,more", 1).unwrap();
    assert_eq!(record, Record::new("2020", "01", "15", "100"));
}

#[test]
fn derived_joins_with_hyphens_in_token_order() {
    let record = Record::new("15", "01", "2020", "100");
    assert_eq!(record.derived(), "15-01-2020");
}

#[test]
fn derived_does_not_interpret_tokens() {
    let record = Record::new("", "b", " c ", "d");
    assert_eq!(record.derived(), "-b- c ");
}

#[test]
fn parse_short_line_is_malformed() {
    match Record::parse("2020,01", 7) {
        Err(TransformError::MalformedRecord { line, found }) => {
            assert_eq!(line, 7);
            assert_eq!(found, 2);
        }
        other => panic!("expected MalformedRecord, got {:?}", other),
    }
}

#[test]
fn parse_empty_line_is_one_empty_token() {
    match Record::parse("", 3) {
        Err(TransformError::MalformedRecord { found, .. }) => assert_eq!(found, 1),
        other => panic!("expected MalformedRecord, got {:?}", other),
    }
}

#[test]
fn parse_accepts_empty_tokens() {
    let record = Record::parse(",,,", 1).unwrap();
    assert_eq!(record, Record::new("", "", "", ""));
    assert_eq!(record.derived(), "--");
}
