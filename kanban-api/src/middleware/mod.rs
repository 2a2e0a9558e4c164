//! Middleware for the API server
//!
//! Authentication lives in `app::jwt_auth_layer`; request logging is
//! tower-http's `TraceLayer`.

pub mod security;
