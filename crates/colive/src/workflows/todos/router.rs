use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::board::{TodoBoard, TodoRepository};
use crate::ids::TodoId;
use crate::storage::RepositoryError;

pub fn todo_router<T>(board: Arc<TodoBoard<T>>) -> Router
where
    T: TodoRepository + 'static,
{
    Router::new()
        .route("/api/v1/admin/todos", get(list_handler::<T>))
        .route(
            "/api/v1/admin/todos/:todo_id/complete",
            post(complete_handler::<T>),
        )
        .with_state(board)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TodoQuery {
    #[serde(default)]
    include_completed: bool,
}

pub(crate) async fn list_handler<T>(
    State(board): State<Arc<TodoBoard<T>>>,
    Query(query): Query<TodoQuery>,
) -> Response
where
    T: TodoRepository + 'static,
{
    let todos = if query.include_completed {
        board.list()
    } else {
        board.pending()
    };

    match todos {
        Ok(todos) => (StatusCode::OK, axum::Json(todos)).into_response(),
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn complete_handler<T>(
    State(board): State<Arc<TodoBoard<T>>>,
    Path(todo_id): Path<String>,
) -> Response
where
    T: TodoRepository + 'static,
{
    match board.mark_completed(&TodoId(todo_id)) {
        Ok(todo) => (StatusCode::OK, axum::Json(todo)).into_response(),
        Err(RepositoryError::NotFound) => {
            let payload = json!({ "error": "todo not found" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
