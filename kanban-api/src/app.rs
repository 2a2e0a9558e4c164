//! Application state and router builder
//!
//! This module defines the shared application state and provides
//! a function to build the Axum router with all routes and middleware.
//!
//! # Example
//!
//! ```no_run
//! use kanban_api::{app::AppState, config::Config};
//! use sqlx::PgPool;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = PgPool::connect(&config.database.url).await?;
//! let state = AppState::new(pool, config);
//! let app = kanban_api::app::build_router(state);
//! # Ok(())
//! # }
//! ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use kanban_shared::{
    auth::{jwt::TokenLifetimes, middleware::authenticate},
    service::Services,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Domain services, all sharing `db`
    pub services: Services,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            services: Services::new(db.clone()),
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    pub fn token_lifetimes(&self) -> TokenLifetimes {
        self.config.token_lifetimes()
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /v1/
///     ├── /auth/                       # register, login, refresh (public), profile
///     ├── /boards/                     # boards and their columns
///     ├── /columns/                    # column edits and task reordering
///     ├── /tasks/                      # task CRUD and moves
///     ├── /calendar/                   # settings, events, task scheduling
///     ├── /timer/                      # task timers
///     └── /analytics/                  # completion statistics
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Authentication (every `/v1` router except the public auth routes)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let profile_routes = Router::new()
        .route("/profile", get(routes::auth::profile))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let board_routes = Router::new()
        .route(
            "/",
            get(routes::boards::list_boards).post(routes::boards::create_board),
        )
        .route("/with-columns", get(routes::boards::list_boards_with_columns))
        .route(
            "/:id",
            put(routes::boards::update_board).delete(routes::boards::delete_board),
        )
        .route(
            "/:id/columns",
            get(routes::boards::get_board_columns).post(routes::columns::create_column),
        )
        .route("/:id/columns/reorder", put(routes::columns::reorder_columns));

    let column_routes = Router::new()
        .route(
            "/:id",
            put(routes::columns::update_column).delete(routes::columns::delete_column),
        )
        .route("/:id/tasks/reorder", put(routes::tasks::reorder_tasks));

    let task_routes = Router::new()
        .route("/", post(routes::tasks::create_task))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/move", put(routes::tasks::move_task));

    let calendar_routes = Router::new()
        .route(
            "/settings",
            get(routes::calendar::get_settings).put(routes::calendar::update_settings),
        )
        .route(
            "/events",
            get(routes::calendar::list_events).post(routes::calendar::create_event),
        )
        .route(
            "/events/:id",
            put(routes::calendar::update_event).delete(routes::calendar::delete_event),
        )
        .route(
            "/tasks/:task_id/events",
            post(routes::calendar::create_event_from_task),
        )
        .route(
            "/tasks/:task_id/schedule",
            put(routes::calendar::update_task_schedule),
        );

    let timer_routes = Router::new()
        .route("/start", post(routes::timer::start_timer))
        .route("/:id/stop", put(routes::timer::stop_timer))
        .route("/active", get(routes::timer::active_timer))
        .route("/history", get(routes::timer::timer_history))
        .route("/tasks/:task_id", get(routes::timer::task_timers));

    let analytics_routes = Router::new().route(
        "/task-completion",
        get(routes::analytics::task_completion),
    );

    let protected_routes = Router::new()
        .nest("/boards", board_routes)
        .nest("/columns", column_routes)
        .nest("/tasks", task_routes)
        .nest("/calendar", calendar_routes)
        .nest("/timer", timer_routes)
        .nest("/analytics", analytics_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes.merge(profile_routes))
        .merge(protected_routes);

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the Bearer access token and injects `AuthContext` into the
/// request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret())?;
    tracing::debug!(user_id = %auth_context.user_id, "Authenticated request");
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
