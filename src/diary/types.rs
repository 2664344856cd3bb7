//! Diary entry types and the raw row shape read from the `diary` table.

use chrono::{DateTime, FixedOffset, TimeZone};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use super::codec::{self, DecodeError};
use super::error::DiaryError;

/// Column list shared by every `SELECT` on the `diary` table, in [`StoredRow`] order.
pub(crate) const ENTRY_COLUMNS: &str = "id, time, milk, urine, poop, created_at";

/// One hour's worth of observations.
///
/// A persisted entry always has an `id`. A placeholder (an hour with no row in a
/// day view) has neither `id` nor `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: Option<i64>,
    pub time: DateTime<FixedOffset>,
    /// Milk quantity, never negative.
    pub milk: i64,
    /// 0 or 1.
    pub urine: i64,
    /// 0 or 1.
    pub poop: i64,
    pub created_at: Option<DateTime<FixedOffset>>,
}

impl DiaryEntry {
    /// Zero-valued stand-in bound to an hour slot.
    pub fn placeholder(time: DateTime<FixedOffset>) -> Self {
        Self {
            id: None,
            time,
            milk: 0,
            urine: 0,
            poop: 0,
            created_at: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_none()
    }

    pub fn counts(&self) -> EntryPatch {
        EntryPatch {
            milk: self.milk,
            urine: self.urine,
            poop: self.poop,
        }
    }
}

/// Request body for create and upsert. Extra fields such as `id` and
/// `created_at` are accepted and ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEntry {
    pub time: DateTime<FixedOffset>,
    #[serde(default)]
    pub milk: i64,
    #[serde(default)]
    pub urine: i64,
    #[serde(default)]
    pub poop: i64,
}

impl NewEntry {
    pub fn counts(&self) -> EntryPatch {
        EntryPatch {
            milk: self.milk,
            urine: self.urine,
            poop: self.poop,
        }
    }

    pub fn validate(&self) -> Result<(), DiaryError> {
        self.counts().validate()
    }
}

/// The mutable fields of an entry. Used as the body of update-by-id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryPatch {
    #[serde(default)]
    pub milk: i64,
    #[serde(default)]
    pub urine: i64,
    #[serde(default)]
    pub poop: i64,
}

impl EntryPatch {
    /// Enforce `milk >= 0` and `urine, poop ∈ {0, 1}`.
    pub fn validate(&self) -> Result<(), DiaryError> {
        if self.milk < 0 {
            return Err(DiaryError::InvalidInput(format!(
                "milk must not be negative (got {})",
                self.milk
            )));
        }
        for (name, value) in [("urine", self.urine), ("poop", self.poop)] {
            if !(0..=1).contains(&value) {
                return Err(DiaryError::InvalidInput(format!(
                    "{name} must be 0 or 1 (got {value})"
                )));
            }
        }
        Ok(())
    }
}

/// Result of a time-bucketed write.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// No row existed for the (day, hour) slot; one was created.
    Inserted(DiaryEntry),
    /// The existing row for the slot was updated in place.
    Updated(DiaryEntry),
}

impl UpsertOutcome {
    pub fn entry(&self) -> &DiaryEntry {
        match self {
            Self::Inserted(entry) | Self::Updated(entry) => entry,
        }
    }

    pub fn into_entry(self) -> DiaryEntry {
        match self {
            Self::Inserted(entry) | Self::Updated(entry) => entry,
        }
    }

    pub fn was_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// A `diary` row exactly as stored, before timestamp decoding.
///
/// The legacy table has no `NOT NULL` constraints, so every value column is optional.
#[derive(Debug, Clone)]
pub(crate) struct StoredRow {
    pub id: i64,
    pub time: Option<String>,
    pub milk: Option<i64>,
    pub urine: Option<i64>,
    pub poop: Option<i64>,
    pub created_at: Option<String>,
}

impl StoredRow {
    /// Map a row selected with [`ENTRY_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            time: row.get(1)?,
            milk: row.get(2)?,
            urine: row.get(3)?,
            poop: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    /// Decode into an entry. Only `time` is mandatory; an unreadable
    /// `created_at` is dropped rather than failing the row.
    pub fn decode<Tz: TimeZone>(self, tz: &Tz) -> Result<DiaryEntry, DecodeError> {
        let time = codec::decode(self.time.as_deref().unwrap_or_default(), tz)?;
        let created_at = self
            .created_at
            .as_deref()
            .and_then(|raw| codec::decode(raw, tz).ok());

        Ok(DiaryEntry {
            id: Some(self.id),
            time,
            milk: self.milk.unwrap_or(0),
            urine: self.urine.unwrap_or(0),
            poop: self.poop.unwrap_or(0),
            created_at,
        })
    }
}
