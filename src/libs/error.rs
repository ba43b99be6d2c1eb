//! Error taxonomy shared by the service layer and the HTTP boundary.
//!
//! Service functions return [`ServiceError`]; `api::error::ApiError` maps each
//! variant to a status code and a JSON body. Internal variants carry the
//! underlying cause for logging only, it is never sent to clients.

use super::messages::Message;
use serde::Serialize;
use thiserror::Error;

/// A single invalid input field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: Message) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    /// One or more request fields failed validation (400).
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// Well-formed request that cannot be honoured (400).
    #[error("{0}")]
    BadRequest(Message),

    /// Missing, malformed or expired credential (401).
    #[error("{}", Message::PleaseAuthenticate)]
    Unauthenticated,

    /// Login with an unknown email or a wrong password (401).
    #[error("{}", Message::InvalidCredentials)]
    InvalidCredentials,

    /// Authenticated, but the role does not allow the operation (403).
    #[error("{}", Message::AdminOnly)]
    Forbidden,

    #[error("{0}")]
    NotFound(Message),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("password hashing error: {0}")]
    Password(String),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("token lifetime of {0}s overflows the expiry time")]
    TokenLifetime(i64),

    #[error("blocking task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

impl ServiceError {
    pub fn field(field: &str, message: Message) -> Self {
        ServiceError::Validation(vec![FieldError::new(field, message)])
    }

    /// True for failures caused by the server rather than the request.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ServiceError::Store(_)
                | ServiceError::Password(_)
                | ServiceError::Token(_)
                | ServiceError::TokenLifetime(_)
                | ServiceError::Blocking(_)
        )
    }
}

impl From<argon2::password_hash::Error> for ServiceError {
    fn from(e: argon2::password_hash::Error) -> Self {
        ServiceError::Password(e.to_string())
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
