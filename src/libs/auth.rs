//! Credentials: password hashing and bearer tokens.
//!
//! Passwords are stored as argon2 PHC strings. Tokens are HS256 JWTs whose
//! subject is the user id; the role is always re-read from the store when a
//! token is presented, so a token never outlives its account.

use super::error::{ServiceError, ServiceResult};
use super::user::{Role, User};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// The acting user of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub role: Role,
}

impl Identity {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> ServiceResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Identity::new(user.id.clone(), user.role)
    }
}

pub fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Checks `password` against a stored hash. An unparseable hash counts as a
/// mismatch.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn issue(&self, user_id: &str, now: DateTime<Utc>) -> ServiceResult<String> {
        let iat = now.timestamp();
        let exp = iat
            .checked_add(self.ttl_secs)
            .ok_or(ServiceError::TokenLifetime(self.ttl_secs))?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat,
            exp,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Returns the subject of a valid token. Bad signatures, malformed input
    /// and expired tokens are all `Unauthenticated`.
    pub fn verify(&self, token: &str) -> ServiceResult<String> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims.sub)
            .map_err(|e| {
                tracing::debug!("rejected token: {}", e);
                ServiceError::Unauthenticated
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("secret1").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
        assert!(!verify_password("secret1", "not-a-hash"));
    }

    #[test]
    fn tokens_carry_the_subject() {
        let issuer = TokenIssuer::new("test-secret", 3600);
        let token = issuer.issue("user-1", Utc::now()).unwrap();
        assert_eq!(issuer.verify(&token).unwrap(), "user-1");
    }

    #[test]
    fn foreign_and_expired_tokens_are_rejected() {
        let issuer = TokenIssuer::new("test-secret", 60);
        let other = TokenIssuer::new("other-secret", 60);

        let token = other.issue("user-1", Utc::now()).unwrap();
        assert!(matches!(issuer.verify(&token), Err(ServiceError::Unauthenticated)));

        let stale = issuer.issue("user-1", Utc::now() - Duration::hours(2)).unwrap();
        assert!(matches!(issuer.verify(&stale), Err(ServiceError::Unauthenticated)));

        assert!(matches!(issuer.verify("garbage"), Err(ServiceError::Unauthenticated)));
    }

    #[test]
    fn overflowing_lifetime_is_an_error() {
        let issuer = TokenIssuer::new("test-secret", i64::MAX);
        assert!(matches!(
            issuer.issue("user-1", Utc::now()),
            Err(ServiceError::TokenLifetime(i64::MAX))
        ));
    }

    #[test]
    fn only_admins_pass_the_guard() {
        assert!(Identity::new("a", Role::Admin).require_admin().is_ok());
        assert!(matches!(
            Identity::new("s", Role::Student).require_admin(),
            Err(ServiceError::Forbidden)
        ));
    }
}
