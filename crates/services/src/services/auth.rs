//! Account registration, login and bearer-token authentication.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use db::models::user::User;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;
use utils::jwt::{JwtError, JwtKeys};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Validation(&'static str),
    #[error("an account with this email already exists")]
    EmailTaken,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("not authorized")]
    Unauthorized,
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Token(#[from] JwtError),
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    keys: JwtKeys,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

impl AuthService {
    pub fn new(keys: JwtKeys) -> Self {
        Self { keys }
    }

    pub async fn register(
        &self,
        pool: &SqlitePool,
        request: RegisterRequest,
    ) -> Result<AuthResponse, AuthError> {
        let name = request.name.trim();
        let email = normalize_email(&request.email);
        if name.is_empty() {
            return Err(AuthError::Validation("name is required"));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Validation("a valid email is required"));
        }
        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(
                "password must be at least 8 characters",
            ));
        }

        if User::find_by_email(pool, &email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password(&request.password)?;
        let user = User::create(pool, Uuid::new_v4(), name, &email, &password_hash)
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    AuthError::EmailTaken
                }
                other => AuthError::Database(other),
            })?;

        info!(user_id = %user.id, "Registered user");
        let token = self.keys.issue(user.id)?;
        Ok(AuthResponse { token, user })
    }

    pub async fn login(
        &self,
        pool: &SqlitePool,
        request: LoginRequest,
    ) -> Result<AuthResponse, AuthError> {
        let email = normalize_email(&request.email);
        let user = User::find_by_email(pool, &email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.keys.issue(user.id)?;
        Ok(AuthResponse { token, user })
    }

    /// Resolve a bearer token to its user. Bad tokens and deleted users are both Unauthorized.
    pub async fn authenticate(&self, pool: &SqlitePool, token: &str) -> Result<User, AuthError> {
        let claims = self
            .keys
            .verify(token)
            .map_err(|_| AuthError::Unauthorized)?;
        User::find_by_id(pool, claims.sub)
            .await?
            .ok_or(AuthError::Unauthorized)
    }
}
