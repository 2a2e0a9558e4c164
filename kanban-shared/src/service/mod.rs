//! Application services
//!
//! Each service holds a `PgPool` handed in at construction. Mutations open a
//! single transaction, check ownership, apply the ordering change and the
//! row writes, then commit; any error drops the transaction and rolls it
//! back.
//!
//! # Example
//!
//! ```no_run
//! use kanban_shared::service::Services;
//! use sqlx::PgPool;
//! use uuid::Uuid;
//!
//! # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
//! let services = Services::new(pool);
//! let board = services.boards.create(user_id, "Roadmap").await?;
//! assert_eq!(board.columns.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod analytics;
pub mod boards;
pub mod calendar;
pub mod columns;
pub mod tasks;
pub mod timer;
pub mod users;

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::ownership::AccessError;
use crate::auth::password::PasswordError;
use crate::ordering::OrderError;

pub use analytics::AnalyticsService;
pub use boards::BoardService;
pub use calendar::CalendarService;
pub use columns::ColumnService;
pub use tasks::TaskService;
pub use timer::TimerService;
pub use users::UserService;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub(crate) fn not_found(kind: &str, id: Uuid) -> Self {
        ServiceError::NotFound(format!("{} {} not found", kind, id))
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db) = err.as_database_error() {
            if db.is_unique_violation() {
                return ServiceError::Conflict("Resource already exists".to_string());
            }
            if db.is_foreign_key_violation() {
                return ServiceError::Validation("Referenced resource does not exist".to_string());
            }
        }
        ServiceError::Database(err)
    }
}

impl From<OrderError> for ServiceError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::ScopeNotFound(_) | OrderError::ItemNotFound(_) => {
                ServiceError::NotFound(err.to_string())
            }
            OrderError::InvalidPosition(_)
            | OrderError::DuplicateItem(_)
            | OrderError::ForeignItem(_) => ServiceError::Validation(err.to_string()),
            OrderError::Concurrent(_) => ServiceError::Conflict(err.to_string()),
            OrderError::Storage(e) => ServiceError::from(e),
        }
    }
}

impl From<AccessError> for ServiceError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotFound { .. } => ServiceError::NotFound(err.to_string()),
            AccessError::Forbidden { .. } => {
                tracing::warn!(error = %err, "Access denied");
                ServiceError::Forbidden(err.to_string())
            }
            AccessError::Database(e) => ServiceError::from(e),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

/// Every service over one pool
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub boards: BoardService,
    pub columns: ColumnService,
    pub tasks: TaskService,
    pub calendar: CalendarService,
    pub timer: TimerService,
    pub analytics: AnalyticsService,
}

impl Services {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserService::new(pool.clone()),
            boards: BoardService::new(pool.clone()),
            columns: ColumnService::new(pool.clone()),
            tasks: TaskService::new(pool.clone()),
            calendar: CalendarService::new(pool.clone()),
            timer: TimerService::new(pool.clone()),
            analytics: AnalyticsService::new(pool),
        }
    }
}
