//! Error taxonomy for the diary core.

use thiserror::Error;

use super::codec::DecodeError;

#[derive(Debug, Error)]
pub enum DiaryError {
    /// A `date` parameter that is not `YYYY-MM-DD`.
    #[error("invalid date format: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// A request body that parsed but carries out-of-domain values.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("diary entry not found: {0}")]
    NotFound(i64),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A row that had to be returned whole but whose `time` column cannot be decoded.
    #[error("diary entry {id} has an unreadable time")]
    CorruptRow {
        id: i64,
        #[source]
        source: DecodeError,
    },
}

impl DiaryError {
    /// `true` for errors the caller caused and should not retry.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDate(_) | Self::InvalidInput(_) | Self::NotFound(_)
        )
    }
}
