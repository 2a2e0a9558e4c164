//! Board endpoints
//!
//! Every board belongs to the authenticated user; another user's board
//! answers `403`, a missing or deleted one `404`.
//!
//! # Endpoints
//!
//! - `GET /v1/boards` - List boards
//! - `POST /v1/boards` - Create a board with the default columns
//! - `GET /v1/boards/with-columns` - List boards with their columns
//! - `GET /v1/boards/:id/columns` - One board with its columns
//! - `PUT /v1/boards/:id` - Rename
//! - `DELETE /v1/boards/:id` - Delete board, columns and tasks

use crate::{app::AppState, error::ApiResult, extract::ValidatedJson};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use kanban_shared::{
    auth::middleware::AuthContext,
    models::board::{Board, BoardPatch, BoardWithColumns, CreateBoard},
};
use uuid::Uuid;

/// Create a board
///
/// # Endpoint
///
/// ```text
/// POST /v1/boards
/// Content-Type: application/json
///
/// { "name": "Sprint 12" }
/// ```
///
/// # Response
///
/// `201 Created` with the board and its columns `To Do`, `In Progress`,
/// `Done` at orders 1, 2, 3.
///
/// # Errors
///
/// - `400 Bad Request`: Name missing or longer than 100 characters
pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidatedJson(req): ValidatedJson<CreateBoard>,
) -> ApiResult<(StatusCode, Json<BoardWithColumns>)> {
    let board = state.services.boards.create(auth.user_id, &req.name).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Board>>> {
    Ok(Json(state.services.boards.list_for_owner(auth.user_id).await?))
}

pub async fn list_boards_with_columns(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<BoardWithColumns>>> {
    Ok(Json(state.services.boards.list_with_columns(auth.user_id).await?))
}

/// Columns are returned in ascending `order`
pub async fn get_board_columns(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<BoardWithColumns>> {
    Ok(Json(
        state
            .services
            .boards
            .get_with_columns(auth.user_id, board_id)
            .await?,
    ))
}

pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    ValidatedJson(patch): ValidatedJson<BoardPatch>,
) -> ApiResult<Json<Board>> {
    Ok(Json(
        state
            .services
            .boards
            .update(auth.user_id, board_id, &patch)
            .await?,
    ))
}

/// Delete a board
///
/// Soft-deletes the board, its columns and their tasks in one transaction.
///
/// # Response
///
/// `204 No Content`
pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.services.boards.delete(auth.user_id, board_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
