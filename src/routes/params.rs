//! Query-string parameters.

use serde::Deserialize;

/// `?date=YYYY-MM-DD`. Absent means today in the server's zone.
#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}
