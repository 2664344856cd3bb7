pub mod day;
pub mod doctor;
pub mod record;

pub use day::{day, list};
pub use doctor::doctor;
pub use record::record;

use anyhow::Result;
use rusqlite::Connection;

use crate::config::DiaryConfig;

/// Open the configured database for a one-shot command.
fn open(config: &DiaryConfig) -> Result<Connection> {
    crate::db::open_database(config.resolved_db_path())
}

/// `✓` for a set flag, `-` otherwise.
fn mark(flag: i64) -> &'static str {
    if flag != 0 {
        "✓"
    } else {
        "-"
    }
}
