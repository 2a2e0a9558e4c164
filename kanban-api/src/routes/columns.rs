//! Column endpoints
//!
//! Column `order` values of a board always run 1..N without gaps; every
//! mutation below renumbers siblings in the same transaction.
//!
//! # Endpoints
//!
//! - `POST /v1/boards/:id/columns` - Create (append or insert at `order`)
//! - `PUT /v1/boards/:id/columns/reorder` - Reorder every column of a board
//! - `PUT /v1/columns/:id` - Rename and/or move
//! - `DELETE /v1/columns/:id` - Delete column and its tasks

use crate::{app::AppState, error::ApiResult, extract::ValidatedJson};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use kanban_shared::{
    auth::middleware::AuthContext,
    models::column::{Column, ColumnPatch, CreateColumn},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ReorderColumnsRequest {
    pub column_ids: Vec<Uuid>,
}

/// Create a column
///
/// # Endpoint
///
/// ```text
/// POST /v1/boards/:id/columns
/// Content-Type: application/json
///
/// { "title": "Review", "order": 2 }
/// ```
///
/// Without `order` the column is appended. An `order` past the end is
/// clamped to N+1.
///
/// # Response
///
/// `201 Created` with the column.
///
/// # Errors
///
/// - `400 Bad Request`: Empty title or `order` < 1
/// - `403 Forbidden`: Board belongs to another user
/// - `404 Not Found`: Board missing or deleted
pub async fn create_column(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<CreateColumn>,
) -> ApiResult<(StatusCode, Json<Column>)> {
    let column = state
        .services
        .columns
        .create(auth.user_id, board_id, &req)
        .await?;

    Ok((StatusCode::CREATED, Json(column)))
}

/// Update a column
///
/// `title` renames; `order` moves the column within its board.
pub async fn update_column(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(column_id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<ColumnPatch>,
) -> ApiResult<Json<Column>> {
    Ok(Json(
        state
            .services
            .columns
            .update(auth.user_id, column_id, &patch)
            .await?,
    ))
}

/// `204 No Content`; later columns move up by one
pub async fn delete_column(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(column_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.columns.delete(auth.user_id, column_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Reorder columns
///
/// # Endpoint
///
/// ```text
/// PUT /v1/boards/:id/columns/reorder
/// Content-Type: application/json
///
/// { "column_ids": ["uuid-c", "uuid-a", "uuid-b"] }
/// ```
///
/// Listed columns take orders 1..k; columns left out keep their relative
/// order after them, so an empty list changes nothing.
///
/// # Response
///
/// The board's columns in their new order.
///
/// # Errors
///
/// - `400 Bad Request`: Duplicate ids or ids from another board
pub async fn reorder_columns(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ReorderColumnsRequest>,
) -> ApiResult<Json<Vec<Column>>> {
    Ok(Json(
        state
            .services
            .columns
            .reorder(auth.user_id, board_id, &req.column_ids)
            .await?,
    ))
}
