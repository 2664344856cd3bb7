//! Diary core: the entry codec, day boundaries, the 24-slot day view, and the
//! write paths (create, update by id, and the (day, hour) upsert).
//!
//! Every operation takes a borrowed [`rusqlite::Connection`] and a time zone.
//! The server passes [`chrono::Local`]; tests pin a [`chrono::FixedOffset`].

pub mod boundary;
pub mod codec;
pub mod day_view;
pub mod error;
pub mod types;
pub mod write;

pub use boundary::{resolve_date, DayBounds, SLOTS_PER_DAY};
pub use day_view::{entries_for_date, full_day};
pub use error::DiaryError;
pub use types::{DiaryEntry, EntryPatch, NewEntry, UpsertOutcome};
pub use write::{create_entry, get_entry, update_entry, upsert_entry};
