//! Entry codec — the on-disk `time` / `created_at` representation.
//!
//! Rows in the `diary` table have been written by more than one code path over
//! time, so the same column may hold offset-qualified RFC 3339 strings, naive
//! `YYYY-MM-DD HH:MM:SS` strings, or the SQLite driver layout with fractional
//! seconds. [`READ_FORMATS`] is the ordered list of layouts accepted on read;
//! the first one that parses wins. Writes always go through [`encode`].

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, TimeZone};
use thiserror::Error;

/// A stored timestamp matched none of [`READ_FORMATS`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("timestamp {0:?} matches none of the accepted formats: {pats}", pats = accepted_patterns())]
pub struct DecodeError(pub String);

fn accepted_patterns() -> String {
    READ_FORMATS
        .iter()
        .map(TimeFormat::pattern)
        .collect::<Vec<_>>()
        .join(", ")
}

/// One accepted on-disk timestamp layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// Full RFC 3339 (`2024-03-01T07:30:00Z`, `2024-03-01T07:30:00.5+09:00`).
    Rfc3339,
    /// `T`-separated, whole seconds, explicit `±HH:MM` suffix.
    OffsetSeconds,
    /// Space-separated with no offset; interpreted in the local zone.
    NaiveLocal,
    /// SQLite driver layout: space-separated, optional fraction, `±HH:MM` suffix.
    DriverOffset,
}

/// Layouts tried by [`decode`], in order.
pub const READ_FORMATS: [TimeFormat; 4] = [
    TimeFormat::Rfc3339,
    TimeFormat::OffsetSeconds,
    TimeFormat::NaiveLocal,
    TimeFormat::DriverOffset,
];

impl TimeFormat {
    /// The `strftime` pattern for this layout (`Rfc3339` uses chrono's dedicated parser).
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::Rfc3339 => "%Y-%m-%dT%H:%M:%S%.f%:z",
            Self::OffsetSeconds => "%Y-%m-%dT%H:%M:%S%:z",
            Self::NaiveLocal => "%Y-%m-%d %H:%M:%S",
            Self::DriverOffset => "%Y-%m-%d %H:%M:%S%.f%:z",
        }
    }

    /// Try this layout alone. Naive values that do not exist in `tz` (DST gap) fail.
    pub fn parse<Tz: TimeZone>(&self, raw: &str, tz: &Tz) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Rfc3339 => DateTime::parse_from_rfc3339(raw).ok(),
            Self::OffsetSeconds | Self::DriverOffset => {
                DateTime::parse_from_str(raw, self.pattern()).ok()
            }
            Self::NaiveLocal => {
                let naive = NaiveDateTime::parse_from_str(raw, self.pattern()).ok()?;
                tz.from_local_datetime(&naive)
                    .earliest()
                    .map(|dt| dt.fixed_offset())
            }
        }
    }
}

/// Decode a stored timestamp, trying each of [`READ_FORMATS`] in turn.
pub fn decode<Tz: TimeZone>(raw: &str, tz: &Tz) -> Result<DateTime<FixedOffset>, DecodeError> {
    let raw = raw.trim();
    READ_FORMATS
        .iter()
        .find_map(|format| format.parse(raw, tz))
        .ok_or_else(|| DecodeError(raw.to_string()))
}

/// Encode an instant for storage: RFC 3339 in the offset `tz` has at that instant.
///
/// Keeping the local offset makes the first ten characters the local calendar day,
/// which is what the day-prefix query matches on.
pub fn encode<Tz: TimeZone>(instant: &DateTime<FixedOffset>, tz: &Tz) -> String {
    localize(instant, tz).to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Re-express an instant in the offset `tz` has at that instant.
pub fn localize<Tz: TimeZone>(instant: &DateTime<FixedOffset>, tz: &Tz) -> DateTime<FixedOffset> {
    instant.with_timezone(tz).fixed_offset()
}
