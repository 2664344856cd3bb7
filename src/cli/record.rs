//! CLI `record` command — upsert one hour's observations.

use anyhow::{Context, Result};
use chrono::{Local, Utc};

use super::{mark, open};
use crate::config::DiaryConfig;
use crate::diary::{self, codec, NewEntry};

/// Record observations for the hour containing `time` (now when `None`).
///
/// `time` accepts anything the entry codec reads, e.g. `2024-03-01 07:00:00`
/// (local) or `2024-03-01T07:00:00+09:00`.
pub fn record(
    config: &DiaryConfig,
    time: Option<&str>,
    milk: i64,
    urine: bool,
    poop: bool,
) -> Result<()> {
    let time = match time {
        Some(raw) => codec::decode(raw, &Local).context("unrecognised --time")?,
        None => Utc::now().with_timezone(&Local).fixed_offset(),
    };

    let entry = NewEntry {
        time,
        milk,
        urine: i64::from(urine),
        poop: i64::from(poop),
    };

    let mut conn = open(config)?;
    let outcome = diary::upsert_entry(&mut conn, &entry, &Local)?;
    let verb = if outcome.was_inserted() { "Recorded" } else { "Updated" };
    let saved = outcome.entry();

    println!(
        "{verb} {} (id {}): milk {}, urine {}, poop {}",
        saved.time.format("%Y-%m-%d %H:00"),
        saved.id.unwrap_or_default(),
        saved.milk,
        mark(saved.urine),
        mark(saved.poop),
    );

    Ok(())
}
