//! Read path — the plain by-date query and the 24-slot day view.
//!
//! Both views share [`fetch_day_rows`]: rows are selected by the text prefix of
//! their `time` column (the target day plus its neighbours), decoded through the
//! codec, and kept only when they fall on the target local calendar day. A row
//! whose timestamp cannot be decoded is logged and skipped; it never fails the
//! request.

use chrono::{NaiveDate, TimeZone};
use rusqlite::{params_from_iter, Connection};
use tracing::{debug, warn};

use super::boundary::DayBounds;
use super::codec;
use super::error::DiaryError;
use super::types::{DiaryEntry, StoredRow, ENTRY_COLUMNS};

/// Persisted entries on `date` in `tz`, sorted by time ascending. No placeholders.
pub fn entries_for_date<Tz: TimeZone>(
    conn: &Connection,
    date: NaiveDate,
    tz: &Tz,
) -> Result<Vec<DiaryEntry>, DiaryError> {
    let bounds = DayBounds::for_date(date, tz)?;

    let mut entries: Vec<DiaryEntry> = fetch_day_rows(conn, &bounds)?
        .into_iter()
        .map(|(_, entry)| entry)
        .collect();
    entries.sort_by_key(|entry| entry.time);

    debug!(date = %date, count = entries.len(), "loaded diary entries");
    Ok(entries)
}

/// The full day view: exactly 24 entries, index = local hour.
///
/// Hours with a persisted row carry that row; the rest are placeholders. Every
/// slot's `time` is the canonical hour instant, whatever the stored row said.
pub fn full_day<Tz: TimeZone>(
    conn: &Connection,
    date: NaiveDate,
    tz: &Tz,
) -> Result<Vec<DiaryEntry>, DiaryError> {
    let bounds = DayBounds::for_date(date, tz)?;

    let mut slots: Vec<DiaryEntry> = bounds
        .hour_slots()
        .into_iter()
        .map(DiaryEntry::placeholder)
        .collect();

    let rows = fetch_day_rows(conn, &bounds)?;
    let found = rows.len();

    // Rows arrive in id order, so a later duplicate for the same hour wins.
    // Slots are indexed by local hour but timed `start + h`; on a DST change
    // day the two disagree and the slot time is kept.
    for (hour, mut entry) in rows {
        if let Some(slot) = slots.get_mut(hour) {
            entry.time = slot.time;
            *slot = entry;
        }
    }

    debug!(date = %date, found, "built full day view");
    Ok(slots)
}

/// Decoded rows on the bounds' calendar day, paired with their local hour, in id order.
pub(crate) fn fetch_day_rows<Tz: TimeZone>(
    conn: &Connection,
    bounds: &DayBounds<Tz>,
) -> Result<Vec<(usize, DiaryEntry)>, DiaryError> {
    let prefixes = bounds.storage_prefixes();
    let markers = vec!["?"; prefixes.len()].join(", ");
    let sql = format!(
        "SELECT {ENTRY_COLUMNS} FROM diary WHERE substr(time, 1, 10) IN ({markers}) ORDER BY id"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(prefixes.iter()), StoredRow::from_row)?;

    let tz = bounds.start.timezone();
    let mut entries = Vec::new();

    for row in rows {
        let row = match row {
            Ok(row) => row,
            Err(err) if is_row_level(&err) => {
                warn!(error = %err, "skipping diary row with unreadable columns");
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let id = row.id;
        let raw = row.time.clone();
        let mut entry = match row.decode(&tz) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(id, raw = ?raw, error = %err, "skipping diary row with unreadable time");
                continue;
            }
        };

        if let Some(hour) = bounds.local_hour(&entry.time) {
            entry.time = codec::localize(&entry.time, &tz);
            entry.created_at = entry.created_at.map(|t| codec::localize(&t, &tz));
            entries.push((hour, entry));
        }
    }

    Ok(entries)
}

/// Errors confined to one row's values, as opposed to the query itself failing.
fn is_row_level(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::IntegralValueOutOfRange(..)
    )
}
