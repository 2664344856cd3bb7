//! Day boundary calculation in the local zone.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta, TimeZone, Timelike, Utc};

use super::error::DiaryError;

/// Number of hour slots in a day view.
pub const SLOTS_PER_DAY: usize = 24;

/// Query-parameter date layout.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Resolve a `date` parameter. `None` or blank means today in `tz`.
///
/// Only zero-padded `YYYY-MM-DD` is accepted; `2024-3-1` and `+2024-03-01` are rejected.
pub fn resolve_date<Tz: TimeZone>(raw: Option<&str>, tz: &Tz) -> Result<NaiveDate, DiaryError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Utc::now().with_timezone(tz).date_naive()),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .ok()
            .filter(|date| date.format(DATE_FORMAT).to_string() == s)
            .ok_or_else(|| DiaryError::InvalidDate(s.to_string())),
    }
}

/// The half-open interval `[start, end)` covering one local calendar day.
#[derive(Debug, Clone)]
pub struct DayBounds<Tz: TimeZone> {
    pub date: NaiveDate,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl<Tz: TimeZone> DayBounds<Tz> {
    /// Bounds for `date` in `tz`. `start` is local midnight, `end` is `start + 24h`.
    pub fn for_date(date: NaiveDate, tz: &Tz) -> Result<Self, DiaryError> {
        // Zones whose DST change skips midnight start the day at the first valid hour.
        let start = (0..SLOTS_PER_DAY as u32)
            .filter_map(|h| date.and_hms_opt(h, 0, 0))
            .find_map(|naive| tz.from_local_datetime(&naive).earliest())
            .ok_or_else(|| DiaryError::InvalidDate(date.format(DATE_FORMAT).to_string()))?;
        let end = start.clone() + TimeDelta::hours(SLOTS_PER_DAY as i64);
        Ok(Self { date, start, end })
    }

    /// `start + h * 1h` for each h in `0..24`.
    pub fn hour_slots(&self) -> Vec<DateTime<FixedOffset>> {
        (0..SLOTS_PER_DAY as i64)
            .map(|h| (self.start.clone() + TimeDelta::hours(h)).fixed_offset())
            .collect()
    }

    /// The local hour of `instant` if it falls on this calendar day, otherwise `None`.
    pub fn local_hour(&self, instant: &DateTime<FixedOffset>) -> Option<usize> {
        let local = instant.with_timezone(&self.start.timezone());
        (local.date_naive() == self.date).then(|| local.hour() as usize)
    }

    /// `YYYY-MM-DD` prefixes of the day before, the day, and the day after.
    ///
    /// Rows stored with a different offset than the local one can carry a
    /// neighbouring date in their text, so the storage query casts this wider
    /// net and [`DayBounds::local_hour`] does the exact filtering.
    pub fn storage_prefixes(&self) -> Vec<String> {
        [self.date.pred_opt(), Some(self.date), self.date.succ_opt()]
            .into_iter()
            .flatten()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect()
    }
}
