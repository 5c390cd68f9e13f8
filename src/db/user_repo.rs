//! Accounts and login sessions.
//!
//! Passwords are stored as `base64(sha256(salt || password))` with a random
//! per-user salt. A session is an opaque random token mapped to a user id.

use base64::{engine::general_purpose, Engine};
use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::parse_timestamp;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    password_hash: String,
    password_salt: String,
    created_at: String,
}

impl UserRow {
    fn into_user(self) -> Result<User, sqlx::Error> {
        Ok(User {
            id: self.id,
            username: self.username,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        })
    }
}

#[derive(Debug)]
pub enum AuthError {
    /// A required credential was blank.
    MissingField(&'static str),
    UsernameTaken(String),
    InvalidCredentials,
    Database(sqlx::Error),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingField(field) => write!(f, "{} is required", field),
            AuthError::UsernameTaken(name) => write!(f, "Username '{}' is already taken", name),
            AuthError::InvalidCredentials => write!(f, "Incorrect username or password"),
            AuthError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::Database(e)
    }
}

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates an account and opens a session for it.
    ///
    /// Returns the user and the session token.
    pub async fn register(&self, username: &str, password: &str) -> Result<(User, String), AuthError> {
        let username = username.trim();
        check_credentials(username, password)?;

        let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            created_at: Utc::now(),
        };
        let salt = generate_salt();
        let password_hash = hash_password(&salt, password);

        sqlx::query(
            "INSERT INTO users (id, username, password_hash, password_salt, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&password_hash)
        .bind(&salt)
        .bind(user.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::info!(user_id = %user.id, "Registered user {}", user.username);

        let token = self.create_session(&user.id).await?;
        Ok((user, token))
    }

    /// Verifies credentials and opens a new session.
    pub async fn login(&self, username: &str, password: &str) -> Result<(User, String), AuthError> {
        let username = username.trim();
        check_credentials(username, password)?;

        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or(AuthError::InvalidCredentials)?;
        if hash_password(&row.password_salt, password) != row.password_hash {
            return Err(AuthError::InvalidCredentials);
        }

        let user = row.into_user()?;
        let token = self.create_session(&user.id).await?;
        Ok((user, token))
    }

    async fn create_session(&self, user_id: &str) -> Result<String, sqlx::Error> {
        let token = generate_token();

        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind(&token)
            .bind(user_id)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;

        Ok(token)
    }

    /// Looks up the user a session token belongs to.
    pub async fn find_by_session(&self, token: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT users.* FROM users JOIN sessions ON sessions.user_id = users.id WHERE sessions.token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }
}

fn check_credentials(username: &str, password: &str) -> Result<(), AuthError> {
    if username.is_empty() {
        return Err(AuthError::MissingField("username"));
    }
    if password.is_empty() {
        return Err(AuthError::MissingField("password"));
    }
    Ok(())
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    general_purpose::STANDARD.encode(hasher.finalize())
}

fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    general_purpose::STANDARD.encode(bytes)
}

/// Generates a session token (32 random bytes, base64url encoded).
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
