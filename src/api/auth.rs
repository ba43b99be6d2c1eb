use super::error::ApiResult;
use super::extract::AuthUser;
use super::{blocking, AppState};
use crate::libs::accounts::{complete_login, AccountService, LoginRequest, LoginResponse, RegisterRequest};
use crate::libs::error::ServiceError;
use crate::libs::messages::Message;
use crate::libs::user::UserProfile;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/profile", get(profile))
}

async fn login(State(state): State<AppState>, payload: Result<Json<LoginRequest>, JsonRejection>) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = payload?;
    let (email, password) = request.validate().map_err(ServiceError::Validation)?;
    let user = {
        let conn = state.db.lock();
        AccountService::new(&conn).find_login(&email)?
    };

    let tokens = state.tokens.clone();
    let response = blocking(move || complete_login(&tokens, &user, &password)).await?;

    Ok(Json(response))
}

async fn register(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    caller.require_admin()?;
    let Json(request) = payload?;
    let account = blocking(move || request.prepare()).await?;
    let user = {
        let conn = state.db.lock();
        AccountService::new(&conn).register_student(&caller, &account)?
    };
    tracing::info!(student = %user.id, "{}", Message::StudentRegistered);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": Message::StudentRegistered.to_string(), "user": user })),
    ))
}

async fn profile(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<UserProfile>> {
    let conn = state.db.lock();
    Ok(Json(AccountService::new(&conn).profile(&caller)?))
}
