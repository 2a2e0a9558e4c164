//! # Kanban API Server Library
//!
//! HTTP layer of the kanban backend: configuration, the Axum router, error
//! mapping and the route handlers that call into `kanban_shared::service`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Validating request extractors
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
