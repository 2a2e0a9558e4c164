//! API route handlers
//!
//! Organized by resource:
//!
//! - `health`: Health check endpoint
//! - `auth`: Registration, login, token refresh and profile
//! - `boards`: Boards
//! - `columns`: Columns of a board
//! - `tasks`: Tasks of a column
//! - `calendar`: Calendar settings, events and task scheduling
//! - `timer`: Task timers
//! - `analytics`: Completion statistics

pub mod analytics;
pub mod auth;
pub mod boards;
pub mod calendar;
pub mod columns;
pub mod health;
pub mod tasks;
pub mod timer;
