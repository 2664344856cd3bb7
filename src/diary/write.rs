//! Write path — plain create, update by id, and the time-bucketed upsert.
//!
//! The upsert resolves its target by (local calendar day, local hour) rather
//! than by primary key. Lookup and write run inside one `BEGIN IMMEDIATE`
//! transaction so two writers cannot both miss the lookup and insert twice.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, info};

use super::boundary::DayBounds;
use super::codec;
use super::day_view::fetch_day_rows;
use super::error::DiaryError;
use super::types::{DiaryEntry, EntryPatch, NewEntry, StoredRow, UpsertOutcome, ENTRY_COLUMNS};

/// Insert `entry` as a new row with no slot matching.
pub fn create_entry<Tz: TimeZone>(
    conn: &Connection,
    entry: &NewEntry,
    tz: &Tz,
) -> Result<DiaryEntry, DiaryError> {
    entry.validate()?;
    let time = codec::localize(&entry.time, tz);
    let created = insert_row(conn, &time, entry.counts(), tz)?;
    info!(id = ?created.id, time = %created.time, "diary entry created");
    Ok(created)
}

/// Fetch one entry by primary key.
pub fn get_entry<Tz: TimeZone>(
    conn: &Connection,
    id: i64,
    tz: &Tz,
) -> Result<DiaryEntry, DiaryError> {
    let row = conn
        .query_row(
            &format!("SELECT {ENTRY_COLUMNS} FROM diary WHERE id = ?1"),
            params![id],
            StoredRow::from_row,
        )
        .optional()?
        .ok_or(DiaryError::NotFound(id))?;

    let mut entry = row
        .decode(tz)
        .map_err(|source| DiaryError::CorruptRow { id, source })?;
    entry.time = codec::localize(&entry.time, tz);
    entry.created_at = entry.created_at.map(|t| codec::localize(&t, tz));
    Ok(entry)
}

/// Overwrite `milk`, `urine` and `poop` of row `id`. `time` and `created_at` are untouched.
pub fn update_entry<Tz: TimeZone>(
    conn: &Connection,
    id: i64,
    patch: &EntryPatch,
    tz: &Tz,
) -> Result<DiaryEntry, DiaryError> {
    patch.validate()?;
    if apply_patch(conn, id, patch)? == 0 {
        return Err(DiaryError::NotFound(id));
    }
    info!(id, "diary entry updated");
    get_entry(conn, id, tz)
}

/// Insert or update the row for the entry's (local day, local hour) slot.
///
/// Minutes and seconds are ignored when matching, so `07:00:01` and `07:59:59`
/// resolve to the same row. On update the stored `time` and `created_at` are kept.
pub fn upsert_entry<Tz: TimeZone>(
    conn: &mut Connection,
    entry: &NewEntry,
    tz: &Tz,
) -> Result<UpsertOutcome, DiaryError> {
    entry.validate()?;
    let time = codec::localize(&entry.time, tz);
    let counts = entry.counts();

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let outcome = match find_slot_row(&tx, &time, tz)? {
        None => {
            let created = insert_row(&tx, &time, counts, tz)?;
            info!(id = ?created.id, time = %time, "diary slot inserted");
            UpsertOutcome::Inserted(created)
        }
        Some(id) => {
            apply_patch(&tx, id, &counts)?;
            info!(id, time = %time, "diary slot updated");
            UpsertOutcome::Updated(get_entry(&tx, id, tz)?)
        }
    };

    tx.commit()?;
    Ok(outcome)
}

/// Id of the existing row in `time`'s slot, lowest id first.
fn find_slot_row<Tz: TimeZone>(
    conn: &Connection,
    time: &DateTime<FixedOffset>,
    tz: &Tz,
) -> Result<Option<i64>, DiaryError> {
    let bounds = DayBounds::for_date(time.date_naive(), tz)?;
    let Some(hour) = bounds.local_hour(time) else {
        return Ok(None);
    };

    let found = fetch_day_rows(conn, &bounds)?
        .into_iter()
        .find(|(h, _)| *h == hour)
        .and_then(|(_, entry)| entry.id);

    debug!(date = %bounds.date, hour, found = ?found, "slot lookup");
    Ok(found)
}

fn insert_row<Tz: TimeZone>(
    conn: &Connection,
    time: &DateTime<FixedOffset>,
    counts: EntryPatch,
    tz: &Tz,
) -> Result<DiaryEntry, DiaryError> {
    let now = Utc::now().with_timezone(tz).fixed_offset();

    conn.execute(
        "INSERT INTO diary (time, milk, urine, poop, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            codec::encode(time, tz),
            counts.milk,
            counts.urine,
            counts.poop,
            codec::encode(&now, tz),
        ],
    )?;

    Ok(DiaryEntry {
        id: Some(conn.last_insert_rowid()),
        time: *time,
        milk: counts.milk,
        urine: counts.urine,
        poop: counts.poop,
        created_at: Some(now),
    })
}

/// Returns the number of rows changed (0 or 1).
fn apply_patch(conn: &Connection, id: i64, patch: &EntryPatch) -> Result<usize, DiaryError> {
    let changed = conn.execute(
        "UPDATE diary SET milk = ?1, urine = ?2, poop = ?3 WHERE id = ?4",
        params![patch.milk, patch.urine, patch.poop, id],
    )?;
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn entry_at(time: &str, milk: i64, urine: i64, poop: i64) -> NewEntry {
        NewEntry {
            time: DateTime::parse_from_rfc3339(time).unwrap(),
            milk,
            urine,
            poop,
        }
    }

    fn row_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM diary", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn create_assigns_id_and_created_at() {
        let conn = db::open_memory_database().unwrap();
        let created =
            create_entry(&conn, &entry_at("2024-03-01T07:15:00+09:00", 3, 1, 0), &jst()).unwrap();

        assert!(created.id.is_some());
        assert!(created.created_at.is_some());

        let stored = get_entry(&conn, created.id.unwrap(), &jst()).unwrap();
        assert_eq!(stored, created);
    }

    #[test]
    fn create_stores_time_in_local_offset() {
        let conn = db::open_memory_database().unwrap();
        create_entry(&conn, &entry_at("2024-02-29T22:30:00Z", 1, 0, 0), &jst()).unwrap();

        let raw: String = conn
            .query_row("SELECT time FROM diary", [], |row| row.get(0))
            .unwrap();
        assert_eq!(raw, "2024-03-01T07:30:00+09:00");
    }

    #[test]
    fn create_rejects_out_of_domain_flags() {
        let conn = db::open_memory_database().unwrap();
        let err = create_entry(&conn, &entry_at("2024-03-01T07:00:00+09:00", 0, 2, 0), &jst())
            .unwrap_err();
        assert!(matches!(err, DiaryError::InvalidInput(_)));
        assert_eq!(row_count(&conn), 0);
    }

    #[test]
    fn update_changes_counts_only() {
        let conn = db::open_memory_database().unwrap();
        let created =
            create_entry(&conn, &entry_at("2024-03-01T07:15:00+09:00", 3, 1, 0), &jst()).unwrap();
        let id = created.id.unwrap();

        let patch = EntryPatch { milk: 90, urine: 0, poop: 1 };
        let updated = update_entry(&conn, id, &patch, &jst()).unwrap();

        assert_eq!(updated.counts(), patch);
        assert_eq!(updated.time, created.time);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let conn = db::open_memory_database().unwrap();
        let err = update_entry(&conn, 42, &EntryPatch::default(), &jst()).unwrap_err();
        assert!(matches!(err, DiaryError::NotFound(42)));
    }

    #[test]
    fn upsert_twice_keeps_one_row_and_first_created_at() {
        let mut conn = db::open_memory_database().unwrap();

        let first = upsert_entry(
            &mut conn,
            &entry_at("2024-03-01T07:00:00+09:00", 60, 0, 0),
            &jst(),
        )
        .unwrap();
        assert!(first.was_inserted());

        let second = upsert_entry(
            &mut conn,
            &entry_at("2024-03-01T07:00:00+09:00", 80, 1, 1),
            &jst(),
        )
        .unwrap();
        assert!(!second.was_inserted());

        assert_eq!(row_count(&conn), 1);
        let (first, second) = (first.into_entry(), second.into_entry());
        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.counts(), EntryPatch { milk: 80, urine: 1, poop: 1 });
    }

    #[test]
    fn upsert_matches_on_hour_not_minute() {
        let mut conn = db::open_memory_database().unwrap();

        upsert_entry(&mut conn, &entry_at("2024-03-01T07:59:59+09:00", 10, 0, 0), &jst()).unwrap();
        let second =
            upsert_entry(&mut conn, &entry_at("2024-03-01T07:00:01+09:00", 20, 0, 0), &jst())
                .unwrap();

        assert!(!second.was_inserted());
        assert_eq!(row_count(&conn), 1);
        assert_eq!(second.entry().milk, 20);
        // The first write's time is kept.
        assert_eq!(second.entry().time.to_rfc3339(), "2024-03-01T07:59:59+09:00");
    }

    #[test]
    fn upsert_separates_hours_and_days() {
        let mut conn = db::open_memory_database().unwrap();

        for time in [
            "2024-03-01T07:00:00+09:00",
            "2024-03-01T08:00:00+09:00",
            "2024-03-02T07:00:00+09:00",
        ] {
            let outcome = upsert_entry(&mut conn, &entry_at(time, 1, 0, 0), &jst()).unwrap();
            assert!(outcome.was_inserted());
        }
        assert_eq!(row_count(&conn), 3);
    }

    #[test]
    fn upsert_matches_rows_written_in_other_formats() {
        let mut conn = db::open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO diary (time, milk, urine, poop, created_at) VALUES ('2024-03-01 07:20:00', 5, 0, 0, '2024-03-01 07:20:00')",
            [],
        )
        .unwrap();

        // Same instant as 07:45 in +09:00, expressed in UTC.
        let outcome =
            upsert_entry(&mut conn, &entry_at("2024-02-29T22:45:00Z", 15, 1, 0), &jst()).unwrap();

        assert!(!outcome.was_inserted());
        assert_eq!(row_count(&conn), 1);
        assert_eq!(outcome.entry().milk, 15);
        assert_eq!(
            outcome.entry().created_at.map(|t| t.to_rfc3339()),
            Some("2024-03-01T07:20:00+09:00".to_string())
        );
    }

    #[test]
    fn failed_slot_lookup_aborts_the_upsert() {
        let mut conn = db::open_memory_database().unwrap();
        upsert_entry(&mut conn, &entry_at("2024-03-01T07:00:00+09:00", 10, 0, 0), &jst()).unwrap();
        conn.execute_batch("ALTER TABLE diary RENAME TO diary_moved").unwrap();

        let err = upsert_entry(&mut conn, &entry_at("2024-03-01T08:00:00+09:00", 20, 0, 0), &jst())
            .unwrap_err();
        assert!(matches!(err, DiaryError::Storage(_)), "{err:?}");

        let (rows, milk): (i64, i64) = conn
            .query_row("SELECT COUNT(*), MAX(milk) FROM diary_moved", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!((rows, milk), (1, 10));
        assert!(conn.is_autocommit());
    }

    #[test]
    fn rejected_upsert_leaves_storage_untouched() {
        let mut conn = db::open_memory_database().unwrap();
        upsert_entry(&mut conn, &entry_at("2024-03-01T07:00:00+09:00", 10, 0, 0), &jst()).unwrap();

        let err = upsert_entry(&mut conn, &entry_at("2024-03-01T07:00:00+09:00", -5, 0, 0), &jst())
            .unwrap_err();
        assert!(matches!(err, DiaryError::InvalidInput(_)));

        let milk: i64 = conn
            .query_row("SELECT milk FROM diary", [], |row| row.get(0))
            .unwrap();
        assert_eq!(milk, 10);
    }
}
