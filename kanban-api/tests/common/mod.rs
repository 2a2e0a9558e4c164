//! Shared setup for API integration tests
//!
//! Tests run against a real PostgreSQL database named by `DATABASE_URL`.
//! Each context registers a fresh user, so tests do not see each other's
//! boards.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use kanban_api::app::{build_router, AppState};
use kanban_api::config::Config;
use kanban_shared::auth::jwt::issue_token_pair;
use kanban_shared::db::migrations::run_migrations;
use kanban_shared::models::user::User;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const TEST_PASSWORD: &str = "Password123";

pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
    pub state: AppState,
    pub user: User,
    pub token: String,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some(database_url.clone()),
            "JWT_SECRET" => Some(TEST_SECRET.to_string()),
            _ => None,
        })?;

        let db = PgPool::connect(&config.database.url).await?;
        run_migrations(&db).await?;

        let state = AppState::new(db.clone(), config);
        let app = build_router(state.clone());

        let (user, token) = register_user(&state).await?;

        Ok(Self {
            db,
            app,
            state,
            user,
            token,
        })
    }

    /// Another registered user on the same app, for ownership checks
    pub async fn other_user(&self) -> anyhow::Result<(User, String)> {
        register_user(&self.state).await
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_as(&self.token, method, uri, body).await
    }

    pub async fn send_as(
        &self,
        token: &str,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token));

        send(&self.app, builder, body).await
    }

    pub async fn send_anonymous(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        send(&self.app, Request::builder().method(method).uri(uri), body).await
    }

    /// Creates a board and returns its id and default column ids in order
    pub async fn create_board(&self, name: &str) -> (Uuid, Vec<Uuid>) {
        let (status, body) = self
            .send(Method::POST, "/v1/boards", Some(serde_json::json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);

        let columns = body["columns"]
            .as_array()
            .expect("columns array")
            .iter()
            .map(id_of)
            .collect();

        (id_of(&body), columns)
    }

    pub async fn create_task(&self, column_id: Uuid, title: &str) -> Uuid {
        let (status, body) = self
            .send(
                Method::POST,
                "/v1/tasks",
                Some(serde_json::json!({ "column_id": column_id, "title": title })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        id_of(&body)
    }
}

async fn register_user(state: &AppState) -> anyhow::Result<(User, String)> {
    let email = format!("test-{}@example.com", Uuid::new_v4());
    let user = state.services.users.register(&email, TEST_PASSWORD).await?;
    let tokens = issue_token_pair(user.id, &user.email, state.jwt_secret(), state.token_lifetimes())?;

    Ok((user, tokens.access_token))
}

async fn send(app: &Router, builder: axum::http::request::Builder, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");

    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, json)
}

pub fn id_of(value: &Value) -> Uuid {
    value["id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| panic!("no id in {}", value))
}

/// `(id, order)` pairs of a JSON array, in array order
pub fn orders(values: &Value) -> Vec<(Uuid, i64)> {
    values
        .as_array()
        .expect("array")
        .iter()
        .map(|v| (id_of(v), v["order"].as_i64().expect("order")))
        .collect()
}
