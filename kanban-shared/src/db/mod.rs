//! Database connection pool and schema migrations
//!
//! Models live in [`crate::models`].

pub mod migrations;
pub mod pool;
