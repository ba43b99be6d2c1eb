use crate::libs::error::ServiceError;
use crate::libs::messages::Message;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// A failed request, rendered as the JSON body clients expect.
#[derive(Debug)]
pub enum ApiError {
    Service(ServiceError),
    /// The body could not be read; carries the status the extractor chose.
    Body(StatusCode, Message),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        ApiError::Service(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Service(ServiceError::BadRequest(Message::MalformedBody(rejection.body_text())))
    }
}

/// A request that is not multipart carries no file.
impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        tracing::debug!("multipart rejected: {}", rejection.body_text());
        ApiError::Service(ServiceError::BadRequest(Message::NoFileUploaded))
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::Body(e.status(), Message::MalformedBody(e.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = |status: StatusCode, message: Message| (status, json!({ "message": message.to_string() }));

        let (status, body) = match self {
            ApiError::Body(status, m) => message(status, m),
            ApiError::Service(ServiceError::Validation(errors)) => (StatusCode::BAD_REQUEST, json!({ "errors": errors })),
            ApiError::Service(ServiceError::BadRequest(m)) => message(StatusCode::BAD_REQUEST, m),
            ApiError::Service(ServiceError::Unauthenticated) => message(StatusCode::UNAUTHORIZED, Message::PleaseAuthenticate),
            ApiError::Service(ServiceError::InvalidCredentials) => message(StatusCode::UNAUTHORIZED, Message::InvalidCredentials),
            ApiError::Service(ServiceError::Forbidden) => message(StatusCode::FORBIDDEN, Message::AdminOnly),
            ApiError::Service(ServiceError::NotFound(m)) => message(StatusCode::NOT_FOUND, m),
            ApiError::Service(internal) => {
                tracing::error!(error = %internal, "request failed");
                message(StatusCode::INTERNAL_SERVER_ERROR, Message::ServerError)
            }
        };

        (status, Json(body)).into_response()
    }
}
