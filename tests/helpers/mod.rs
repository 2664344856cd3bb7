#![allow(dead_code)]

use babydiary::db;
use babydiary::diary::NewEntry;
use chrono::{DateTime, FixedOffset, NaiveDate};
use rusqlite::{params, Connection};

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    db::open_memory_database().unwrap()
}

/// The zone every test runs in: UTC+9, no DST.
pub fn tz() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn entry_at(time: &str, milk: i64, urine: i64, poop: i64) -> NewEntry {
    NewEntry {
        time: DateTime::parse_from_rfc3339(time).unwrap(),
        milk,
        urine,
        poop,
    }
}

/// Insert a row with a raw `time` string, bypassing the codec. Returns the row id.
pub fn insert_raw(conn: &Connection, time: &str, milk: i64, urine: i64, poop: i64) -> i64 {
    conn.execute(
        "INSERT INTO diary (time, milk, urine, poop, created_at) VALUES (?1, ?2, ?3, ?4, ?1)",
        params![time, milk, urine, poop],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub fn row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM diary", [], |row| row.get(0))
        .unwrap()
}
