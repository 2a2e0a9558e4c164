//! Analytics endpoints
//!
//! # Endpoint
//!
//! ```text
//! GET /v1/analytics/task-completion?year=2025
//! ```
//!
//! # Response
//!
//! ```json
//! {
//!   "year": 2025,
//!   "total_tasks": 4,
//!   "daily_stats": { "2025-01-02": 3, "2025-01-09": 1 }
//! }
//! ```
//!
//! Days are UTC. Without `year` the current year is used.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};
use chrono::{Datelike, Utc};
use kanban_shared::{auth::middleware::AuthContext, service::analytics::TaskCompletionStats};
use serde::Deserialize;
use std::ops::RangeInclusive;

const SUPPORTED_YEARS: RangeInclusive<i32> = 1970..=9999;

#[derive(Debug, Default, Deserialize)]
pub struct CompletionQuery {
    pub year: Option<i32>,
}

fn resolve_year(requested: Option<i32>) -> ApiResult<i32> {
    let year = requested.unwrap_or_else(|| Utc::now().year());
    if SUPPORTED_YEARS.contains(&year) {
        Ok(year)
    } else {
        Err(ApiError::BadRequest(format!(
            "Year must be between {} and {}",
            SUPPORTED_YEARS.start(),
            SUPPORTED_YEARS.end()
        )))
    }
}

pub async fn task_completion(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<CompletionQuery>, QueryRejection>,
) -> ApiResult<Json<TaskCompletionStats>> {
    let Query(query) = query?;
    let year = resolve_year(query.year)?;

    Ok(Json(
        state
            .services
            .analytics
            .task_completion(auth.user_id, year)
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_defaults_to_current() {
        assert_eq!(resolve_year(None).unwrap(), Utc::now().year());
    }

    #[test]
    fn test_year_bounds() {
        assert_eq!(resolve_year(Some(2024)).unwrap(), 2024);
        assert!(matches!(resolve_year(Some(1969)), Err(ApiError::BadRequest(_))));
        assert!(matches!(resolve_year(Some(10_000)), Err(ApiError::BadRequest(_))));
    }
}
