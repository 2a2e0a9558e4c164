//! Task completion statistics
use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::ServiceError;

/// Per-day completion counts for one calendar year (UTC)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskCompletionStats {
    pub year: i32,
    pub total_tasks: i64,

    /// `YYYY-MM-DD` to tasks completed that day; days without completions
    /// are omitted
    pub daily_stats: BTreeMap<String, i64>,
}

impl TaskCompletionStats {
    fn from_rows(year: i32, rows: Vec<(NaiveDate, i64)>) -> Self {
        let total_tasks = rows.iter().map(|(_, count)| count).sum();
        let daily_stats = rows
            .into_iter()
            .map(|(day, count)| (day.format("%Y-%m-%d").to_string(), count))
            .collect();

        Self {
            year,
            total_tasks,
            daily_stats,
        }
    }
}

#[derive(Clone)]
pub struct AnalyticsService {
    pool: PgPool,
}

impl AnalyticsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Counts the user's live tasks completed during `year`
    pub async fn task_completion(&self, user_id: Uuid, year: i32) -> Result<TaskCompletionStats, ServiceError> {
        let midnight = |y: i32| NaiveDate::from_ymd_opt(y, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        let (Some(first), Some(next)) = (midnight(year), midnight(year.saturating_add(1))) else {
            return Err(ServiceError::Validation(format!("Invalid year {}", year)));
        };

        let start = Utc.from_utc_datetime(&first);
        let end = Utc.from_utc_datetime(&next);

        let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT (t.completed_at AT TIME ZONE 'UTC')::DATE AS day, COUNT(*) AS completed
            FROM tasks t
            JOIN board_columns c ON c.id = t.column_id AND c.deleted_at IS NULL
            JOIN boards b ON b.id = c.board_id AND b.deleted_at IS NULL
            WHERE b.owner_id = $1
              AND t.deleted_at IS NULL
              AND t.is_completed
              AND t.completed_at >= $2 AND t.completed_at < $3
            GROUP BY day
            ORDER BY day
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(TaskCompletionStats::from_rows(year, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_from_rows() {
        let day = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
        let stats = TaskCompletionStats::from_rows(2025, vec![(day(2), 3), (day(9), 1)]);

        assert_eq!(stats.year, 2025);
        assert_eq!(stats.total_tasks, 4);
        assert_eq!(stats.daily_stats.get("2025-01-02"), Some(&3));
        assert_eq!(stats.daily_stats.get("2025-01-09"), Some(&1));
        assert_eq!(stats.daily_stats.len(), 2);
    }

    #[test]
    fn test_stats_serialize_shape() {
        let stats = TaskCompletionStats::from_rows(2024, Vec::new());
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "year": 2024, "total_tasks": 0, "daily_stats": {} })
        );
    }
}
