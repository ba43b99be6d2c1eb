use super::error::ApiError;
use super::AppState;
use crate::libs::accounts::AccountService;
use crate::libs::auth::Identity;
use crate::libs::error::ServiceError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// The authenticated caller. Rejects the request with 401 when the bearer
/// token is missing, invalid, expired or names a deleted account.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(ServiceError::Unauthenticated)?;

        let user_id = state.tokens.verify(token)?;
        let conn = state.db.lock();
        let identity = AccountService::new(&conn).authenticate(&user_id)?;

        Ok(AuthUser(identity))
    }
}
