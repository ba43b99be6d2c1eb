use super::error::ApiResult;
use super::extract::AuthUser;
use super::{blocking, AppState};
use crate::libs::accounts::AccountService;
use crate::libs::error::ServiceError;
use crate::libs::import::{import_students, parse_roster, prepare_roster, ImportResponse};
use crate::libs::lifecycle::TaskService;
use crate::libs::messages::Message;
use crate::libs::stats::PerformanceReport;
use crate::libs::user::UserProfile;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// Largest accepted roster upload.
pub const UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

const UPLOAD_FIELD: &str = "file";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/students", get(students))
        .route("/upload", post(upload).layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES)))
        .route("/students/:id", delete(remove_student))
        .route("/students/:id/performance", get(performance))
}

async fn students(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<Vec<UserProfile>>> {
    let conn = state.db.lock();
    Ok(Json(AccountService::new(&conn).list_students(&caller)?))
}

async fn upload(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    payload: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportResponse>> {
    caller.require_admin()?;
    let mut multipart = payload?;

    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            file = Some(field.bytes().await?);
            break;
        }
    }
    let file = file
        .filter(|bytes| !bytes.is_empty())
        .ok_or(ServiceError::BadRequest(Message::NoFileUploaded))?;

    let rows = parse_roster(&file)?;
    let importer = caller.clone();
    let prepared = blocking(move || prepare_roster(&importer, &rows)).await?;
    let results = {
        let conn = state.db.lock();
        import_students(&conn, &caller, prepared)?
    };

    Ok(Json(ImportResponse {
        message: Message::FileProcessed.to_string(),
        results,
    }))
}

async fn remove_student(State(state): State<AppState>, AuthUser(caller): AuthUser, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let conn = state.db.lock();
    TaskService::new(&conn).delete_student(&caller, &id)?;

    Ok(Json(json!({ "message": Message::StudentDeleted.to_string() })))
}

async fn performance(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<PerformanceReport>> {
    let conn = state.db.lock();
    Ok(Json(TaskService::new(&conn).student_performance(&caller, &id)?))
}
