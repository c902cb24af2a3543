//! ISO-8601 timestamp normalization.
//!
//! Timestamps are rendered on their own local clock as
//! `YYYY-MM-DD HH:MM:SS.mmm`, with the UTC offset split out as `±HH:MM`.
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::Value;
use thiserror::Error;

use super::Diagnostics;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const OFFSET_FORMAT: &str = "%:z";

/// Layouts with an explicit numeric offset that RFC 3339 rejects
/// (compact `+0500`, missing seconds, space separator).
const OFFSET_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

/// Layouts without any offset information.
const NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("empty timestamp")]
    Empty,

    #[error("timestamp is not a string")]
    NotAString,

    #[error("unrecognized ISO-8601 timestamp {0:?}")]
    Unrecognized(String),
}

/// A normalized timestamp: local-clock rendering plus offset.
///
/// Both halves are absent when parsing fails; the offset alone is absent
/// when the input carried no offset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTime {
    pub time: Option<String>,
    pub offset: Option<String>,
}

impl ParsedTime {
    /// The (absent, absent) pair.
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    fn from_offset_datetime(dt: &DateTime<FixedOffset>) -> Self {
        Self {
            time: Some(dt.format(TIMESTAMP_FORMAT).to_string()),
            offset: Some(dt.format(OFFSET_FORMAT).to_string()),
        }
    }

    fn from_naive(dt: &NaiveDateTime) -> Self {
        Self {
            time: Some(dt.format(TIMESTAMP_FORMAT).to_string()),
            offset: None,
        }
    }

    /// Field-wise fallback: each half independently takes `other`'s value
    /// when missing here.
    #[must_use]
    pub fn or(&self, other: &ParsedTime) -> ParsedTime {
        ParsedTime {
            time: self.time.clone().or_else(|| other.time.clone()),
            offset: self.offset.clone().or_else(|| other.offset.clone()),
        }
    }
}

/// Parse an ISO-8601 timestamp strictly.
pub fn try_parse_datetime(input: &str) -> Result<ParsedTime, TimeParseError> {
    let original = input.trim();
    if original.is_empty() {
        return Err(TimeParseError::Empty);
    }
    let canonical = canonicalize(original);
    let input = canonical.as_str();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(ParsedTime::from_offset_datetime(&dt));
    }

    for layout in OFFSET_LAYOUTS {
        if let Ok(dt) = DateTime::parse_from_str(input, layout) {
            return Ok(ParsedTime::from_offset_datetime(&dt));
        }
    }

    // `Z` suffix on a layout RFC 3339 does not cover (e.g. no seconds)
    if let Some(rest) = input.strip_suffix(['Z', 'z']) {
        if let Some(naive) = parse_naive(rest) {
            let utc = naive.and_utc().fixed_offset();
            return Ok(ParsedTime::from_offset_datetime(&utc));
        }
    }

    if let Some(naive) = parse_naive(input) {
        return Ok(ParsedTime::from_naive(&naive));
    }

    Err(TimeParseError::Unrecognized(original.to_string()))
}

/// Rewrite the ISO-8601 variants chrono has no layout for into extended
/// form: comma decimal separator, basic format, and hour-only offsets.
fn canonicalize(input: &str) -> String {
    let mut out = input.replace(',', ".");
    if let Some(extended) = expand_basic_format(&out) {
        out = extended;
    }

    let bytes = out.as_bytes();
    let n = bytes.len();
    let hour_only_offset = n >= 4
        && matches!(bytes[n - 3], b'+' | b'-')
        && bytes[n - 2].is_ascii_digit()
        && bytes[n - 1].is_ascii_digit()
        && bytes[n - 4].is_ascii_digit()
        && out[..n - 3].contains(['T', 't', ' ']);
    if hour_only_offset {
        out.push_str(":00");
    }
    out
}

/// `YYYYMMDD[THHMM[SS]...]` to `YYYY-MM-DD[THH:MM[:SS]...]`.
fn expand_basic_format(input: &str) -> Option<String> {
    let date_len = input.bytes().take_while(u8::is_ascii_digit).count();
    if date_len != 8 {
        return None;
    }
    let (digits, rest) = input.split_at(8);
    let date = format!("{}-{}-{}", &digits[..4], &digits[4..6], &digits[6..]);
    if rest.is_empty() {
        return Some(date);
    }

    let rest = rest.strip_prefix(['T', 't'])?;
    let clock_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let (clock, tail) = rest.split_at(clock_len);
    let clock = match clock_len {
        4 => format!("{}:{}", &clock[..2], &clock[2..]),
        6 => format!("{}:{}:{}", &clock[..2], &clock[2..4], &clock[4..]),
        _ => return None,
    };
    Some(format!("{date}T{clock}{tail}"))
}

fn parse_naive(input: &str) -> Option<NaiveDateTime> {
    NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(input, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse an optional JSON value as a timestamp, never failing.
///
/// Missing, `null` and empty values yield the absent pair silently; any
/// other failure is reported to `diag` first.
pub fn parse_datetime(value: Option<&Value>, diag: &mut Diagnostics) -> ParsedTime {
    let result = match value {
        None | Some(Value::Null) => Err(TimeParseError::Empty),
        Some(Value::String(s)) => try_parse_datetime(s),
        Some(_) => Err(TimeParseError::NotAString),
    };

    match result {
        Ok(parsed) => parsed,
        Err(TimeParseError::Empty) => ParsedTime::absent(),
        Err(e) => {
            if let Some(v) = value {
                diag.time_failure(v, &e);
            }
            ParsedTime::absent()
        }
    }
}
