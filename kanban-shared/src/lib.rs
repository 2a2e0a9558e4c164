//! # Kanban shared library
//!
//! Domain code behind the kanban HTTP API: models, the ordering engine that
//! keeps columns and tasks contiguously numbered, ownership checks and the
//! services that combine them in one transaction per operation.
//!
//! ## Module Organization
//!
//! - `models`: database models and request payloads
//! - `ordering`: contiguous position maintenance for columns and tasks
//! - `auth`: passwords, JWTs, request authentication and ownership checks
//! - `service`: transactional operations used by the API handlers
//! - `db`: connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod ordering;
pub mod service;

/// Current version of the kanban shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
