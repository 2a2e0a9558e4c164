//! Database models for the kanban backend
//!
//! Each model is a `sqlx::FromRow` struct with associated async functions
//! that take any Postgres executor (`&PgPool` or `&mut *tx`), so the same
//! helpers work inside and outside a transaction.
//!
//! # Models
//!
//! - `user`: accounts
//! - `board`: boards and the default column set
//! - `column`: ordered columns of a board
//! - `task`: ordered tasks of a column
//! - `calendar`: calendar events and per-user settings
//! - `timer`: task timer sessions
//! - `patch`: helpers for partial-update payloads

pub mod board;
pub mod calendar;
pub mod column;
pub mod patch;
pub mod task;
pub mod timer;
pub mod user;
