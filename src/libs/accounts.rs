//! Accounts: login, student registration, profiles and the roster.
//!
//! Password hashing and verification need no store. They are split out
//! ([`RegisterRequest::prepare`], [`complete_login`]) so the server can run
//! them without holding the connection.

use super::auth::{hash_password, verify_password, Identity, TokenIssuer};
use super::error::{FieldError, ServiceError, ServiceResult};
use super::messages::Message;
use super::user::{is_valid_email, normalize_email, NewUser, Role, User, UserProfile};
use crate::db::users::Users;
use chrono::Utc;
use rusqlite::{Connection, ErrorCode};
use serde::{Deserialize, Serialize};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns the normalized email and the password.
    pub fn validate(&self) -> Result<(String, String), Vec<FieldError>> {
        let mut errors = Vec::new();
        let email = normalize_email(self.email.as_deref().unwrap_or_default());
        if !is_valid_email(&email) {
            errors.push(FieldError::new("email", Message::EmailInvalid));
        }
        let password = self.password.as_deref().unwrap_or_default();
        if password.is_empty() {
            errors.push(FieldError::new("password", Message::PasswordRequired));
        }

        if errors.is_empty() {
            Ok((email, password.to_string()))
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Body of `POST /auth/register`, also used by the `admin` command.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl RegisterRequest {
    /// Returns the trimmed name and the normalized email, or every field
    /// that is wrong.
    pub fn validate(&self) -> Result<(String, String, String), Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            errors.push(FieldError::new("name", Message::NameRequired));
        }
        let email = normalize_email(self.email.as_deref().unwrap_or_default());
        if !is_valid_email(&email) {
            errors.push(FieldError::new("email", Message::EmailInvalid));
        }
        let password = self.password.as_deref().unwrap_or_default();
        if password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new("password", Message::PasswordTooShort(MIN_PASSWORD_LEN)));
        }

        if errors.is_empty() {
            Ok((name.to_string(), email, password.to_string()))
        } else {
            Err(errors)
        }
    }

    /// Validates the request and hashes the password.
    pub fn prepare(&self) -> ServiceResult<NewAccount> {
        let (name, email, password) = self.validate().map_err(ServiceError::Validation)?;
        Ok(NewAccount {
            name,
            email,
            password_hash: hash_password(&password)?,
        })
    }
}

/// A validated account with its password already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    /// Normalized.
    pub email: String,
    pub password_hash: String,
}

/// Checks `password` against the stored hash and signs a token for `user`.
pub fn complete_login(tokens: &TokenIssuer, user: &User, password: &str) -> ServiceResult<LoginResponse> {
    if !verify_password(password, &user.password_hash) {
        return Err(ServiceError::InvalidCredentials);
    }

    Ok(LoginResponse {
        token: tokens.issue(&user.id, Utc::now())?,
        user: UserProfile::from(user),
    })
}

pub struct AccountService<'a> {
    conn: &'a Connection,
}

impl<'a> AccountService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// The account a login attempt names. The password is checked
    /// afterwards by [`complete_login`].
    pub fn find_login(&self, email: &str) -> ServiceResult<User> {
        Users::new(self.conn)
            .get_by_email(email)?
            .ok_or(ServiceError::InvalidCredentials)
    }

    /// Resolves a token subject to the acting identity. A subject whose
    /// account is gone is unauthenticated.
    pub fn authenticate(&self, user_id: &str) -> ServiceResult<Identity> {
        Users::new(self.conn)
            .get_by_id(user_id)?
            .map(|user| Identity::from(&user))
            .ok_or(ServiceError::Unauthenticated)
    }

    pub fn register_student(&self, caller: &Identity, account: &NewAccount) -> ServiceResult<UserProfile> {
        caller.require_admin()?;

        let user = self
            .insert(account, Role::Student)
            .map_err(|e| duplicate_as(e, Message::EmailAlreadyRegistered))?;

        Ok(UserProfile::from(&user))
    }

    /// Creates an admin account. Only reachable from the command line.
    pub fn create_admin(&self, account: &NewAccount) -> ServiceResult<UserProfile> {
        let user = self
            .insert(account, Role::Admin)
            .map_err(|e| duplicate_as(e, Message::EmailAlreadyRegistered))?;

        Ok(UserProfile::from(&user))
    }

    pub fn profile(&self, caller: &Identity) -> ServiceResult<UserProfile> {
        Users::new(self.conn)
            .get_by_id(&caller.id)?
            .map(|user| UserProfile::from(&user))
            .ok_or(ServiceError::Unauthenticated)
    }

    /// Students, newest first.
    pub fn list_students(&self, caller: &Identity) -> ServiceResult<Vec<UserProfile>> {
        caller.require_admin()?;

        Ok(Users::new(self.conn).list_students()?.iter().map(UserProfile::from).collect())
    }

    /// Inserts the account with the given role. A taken email fails with
    /// `EmailAlreadyExists`, or with a constraint error when two inserts
    /// race; [`is_duplicate`] covers both.
    pub fn insert(&self, account: &NewAccount, role: Role) -> ServiceResult<User> {
        let users = Users::new(self.conn);
        if users.get_by_email(&account.email)?.is_some() {
            return Err(ServiceError::BadRequest(Message::EmailAlreadyExists));
        }

        let new_user = NewUser {
            name: account.name.clone(),
            email: account.email.clone(),
            password_hash: account.password_hash.clone(),
            role,
        };
        Ok(users.insert(&new_user, Utc::now())?)
    }
}

/// True when `error` means the email is already taken, whether caught by the
/// lookup or by the UNIQUE constraint.
pub fn is_duplicate(error: &ServiceError) -> bool {
    match error {
        ServiceError::BadRequest(Message::EmailAlreadyExists) => true,
        ServiceError::Store(rusqlite::Error::SqliteFailure(e, _)) => e.code == ErrorCode::ConstraintViolation,
        _ => false,
    }
}

fn duplicate_as(error: ServiceError, message: Message) -> ServiceError {
    if is_duplicate(&error) {
        ServiceError::BadRequest(message)
    } else {
        error
    }
}
