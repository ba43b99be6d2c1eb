use super::error::ApiResult;
use super::extract::AuthUser;
use super::AppState;
use crate::libs::lifecycle::TaskService;
use crate::libs::messages::Message;
use crate::libs::stats::StudentCompletion;
use crate::libs::task::{CreateTaskRequest, StatusUpdateRequest, TaskView};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch};
use axum::{Json, Router};
use serde_json::{json, Value};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/stats", get(stats))
        .route("/:id", delete(remove))
        .route("/:id/status", patch(update_status))
}

async fn create(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    caller.require_admin()?;
    let Json(request) = payload?;
    let conn = state.db.lock();
    let task = TaskService::new(&conn).create(&caller, &request)?;

    Ok((StatusCode::CREATED, Json(task)))
}

async fn list(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<Vec<TaskView>>> {
    let conn = state.db.lock();
    Ok(Json(TaskService::new(&conn).list(&caller)?))
}

async fn update_status(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> ApiResult<Json<TaskView>> {
    let Json(request) = payload?;
    let conn = state.db.lock();
    let task = TaskService::new(&conn).set_status(&caller, &id, &request)?;

    Ok(Json(task))
}

async fn remove(State(state): State<AppState>, AuthUser(caller): AuthUser, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let conn = state.db.lock();
    TaskService::new(&conn).delete(&caller, &id)?;

    Ok(Json(json!({ "message": Message::TaskDeleted.to_string() })))
}

async fn stats(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<Vec<StudentCompletion>>> {
    let conn = state.db.lock();
    Ok(Json(TaskService::new(&conn).completion_stats(&caller)?))
}
