//! HTTP surface of the diary.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET  | `/api/health` | liveness |
//! | GET  | `/api/diary?date=` | persisted entries for a day |
//! | POST | `/api/diary` | plain create |
//! | GET  | `/api/diary/full?date=` (alias `/full-day`) | 24-slot day view |
//! | POST | `/api/diary/upsert` (alias `/time`) | (day, hour) upsert: 201 on insert, 200 on update |
//! | GET  | `/api/diary/{id}` | fetch by id |
//! | PUT  | `/api/diary/{id}` | update counts by id |

pub mod error;
pub mod params;

use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::TimeZone;
use rusqlite::Connection;

use crate::diary::{self, DiaryEntry, DiaryError, EntryPatch, NewEntry};
pub use error::ApiError;
use params::DateQuery;

/// Time zones the server can run in: `chrono::Local` in production, a fixed
/// offset in tests.
pub trait DiaryZone: TimeZone + Copy + Send + Sync + 'static {}

impl<T: TimeZone + Copy + Send + Sync + 'static> DiaryZone for T {}

/// Shared handler state: the single storage handle and the local zone.
#[derive(Clone)]
pub struct AppState<Tz> {
    db: Arc<Mutex<Connection>>,
    tz: Tz,
}

impl<Tz: DiaryZone> AppState<Tz> {
    pub fn new(db: Arc<Mutex<Connection>>, tz: Tz) -> Self {
        Self { db, tz }
    }

    /// Run a synchronous diary operation on the blocking pool.
    async fn with_db<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &Tz) -> Result<T, DiaryError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let tz = self.tz;
        tokio::task::spawn_blocking(move || {
            let mut conn = db.lock().unwrap_or_else(PoisonError::into_inner);
            op(&mut conn, &tz)
        })
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("db task failed: {e}")))?
        .map_err(ApiError::from)
    }
}

pub fn router<Tz: DiaryZone>(state: AppState<Tz>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/diary",
            get(list_by_date::<Tz>).post(create::<Tz>),
        )
        .route("/api/diary/full", get(full_day::<Tz>))
        .route("/api/diary/full-day", get(full_day::<Tz>))
        .route("/api/diary/upsert", post(upsert::<Tz>))
        .route("/api/diary/time", post(upsert::<Tz>))
        .route(
            "/api/diary/{id}",
            get(get_by_id::<Tz>).put(update_by_id::<Tz>),
        )
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_by_date<Tz: DiaryZone>(
    State(state): State<AppState<Tz>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<DiaryEntry>>, ApiError> {
    let date = diary::resolve_date(query.date.as_deref(), &state.tz)?;
    let entries = state
        .with_db(move |conn, tz| diary::entries_for_date(conn, date, tz))
        .await?;
    Ok(Json(entries))
}

async fn full_day<Tz: DiaryZone>(
    State(state): State<AppState<Tz>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<Vec<DiaryEntry>>, ApiError> {
    let date = diary::resolve_date(query.date.as_deref(), &state.tz)?;
    tracing::debug!(date = %date, "full day requested");
    let slots = state
        .with_db(move |conn, tz| diary::full_day(conn, date, tz))
        .await?;
    Ok(Json(slots))
}

async fn create<Tz: DiaryZone>(
    State(state): State<AppState<Tz>>,
    payload: Result<Json<NewEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<DiaryEntry>), ApiError> {
    let Json(entry) = payload?;
    entry.validate()?;
    let created = state
        .with_db(move |conn, tz| diary::create_entry(conn, &entry, tz))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn upsert<Tz: DiaryZone>(
    State(state): State<AppState<Tz>>,
    payload: Result<Json<NewEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<DiaryEntry>), ApiError> {
    let Json(entry) = payload?;
    entry.validate()?;
    let outcome = state
        .with_db(move |conn, tz| diary::upsert_entry(conn, &entry, tz))
        .await?;

    let status = if outcome.was_inserted() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.into_entry())))
}

async fn get_by_id<Tz: DiaryZone>(
    State(state): State<AppState<Tz>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DiaryEntry>, ApiError> {
    let Path(id) = id?;
    let entry = state
        .with_db(move |conn, tz| diary::get_entry(conn, id, tz))
        .await?;
    Ok(Json(entry))
}

async fn update_by_id<Tz: DiaryZone>(
    State(state): State<AppState<Tz>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<EntryPatch>, JsonRejection>,
) -> Result<Json<DiaryEntry>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    patch.validate()?;
    let updated = state
        .with_db(move |conn, tz| diary::update_entry(conn, id, &patch, tz))
        .await?;
    Ok(Json(updated))
}
