//! SQL DDL for the `diary` table and the `schema_meta` bookkeeping table.
//!
//! All DDL uses `IF NOT EXISTS`, so opening a database created by an older
//! build leaves its rows untouched.

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
-- One row per observed hour; uniqueness of (day, hour) is enforced by the writer.
CREATE TABLE IF NOT EXISTS diary (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    time TEXT,
    milk INTEGER,
    urine INTEGER DEFAULT 0 CHECK (urine IN (0, 1)),
    poop INTEGER DEFAULT 0 CHECK (poop IN (0, 1)),
    created_at TEXT
);

CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;

    Ok(())
}
