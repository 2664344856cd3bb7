//! Hour-by-hour care diary: milk feedings, urination, and bowel movements for
//! a single subject, stored in SQLite and served over a small HTTP API.
//!
//! A day is viewed as 24 hour slots. Each slot holds at most one persisted
//! entry; hours without one are filled with zero-valued placeholders so that
//! clients always receive a complete day.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite database initialization, schema, migrations, and health checks
//! - [`diary`] — Core: entry codec, day boundaries, the day view, and the write paths
//! - [`routes`] — axum router and HTTP error mapping
//! - [`server`] — HTTP server bootstrap
//! - [`cli`] — Terminal subcommands

pub mod cli;
pub mod config;
pub mod db;
pub mod diary;
pub mod routes;
pub mod server;
