//! Server-side session rows.
//!
//! A session is created or rewritten only by an explicit write (login,
//! signup); reads never extend its life. Expired rows are invisible to
//! `read` immediately and physically deleted by the purge sweeper later.

use chrono::{Duration, Utc};
use rand::Rng;

use crate::db::{DbPool, Role, SessionRecord};
use crate::error::Error;

/// Generate a random session id
fn generate_session_id() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

#[derive(Clone)]
pub struct SessionStore {
    db: DbPool,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(db: DbPool, ttl_minutes: u64) -> Self {
        Self {
            db,
            ttl: Duration::minutes(ttl_minutes as i64),
        }
    }

    /// Insert a fresh session carrying the signed-in identity and return
    /// its id. The id doubles as the cookie value.
    pub async fn create(&self, name: &str, role: Role) -> Result<String, Error> {
        let id = generate_session_id();
        let now = Utc::now();
        let expires_at = (now + self.ttl).to_rfc3339();

        sqlx::query(
            "INSERT INTO sessions (id, name, role, expires_at, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(role.as_str())
        .bind(&expires_at)
        .bind(now.to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(id)
    }

    /// Look up a live session. Unknown ids and rows past their expiry both
    /// come back as `None`; expiry is checked here, not in SQL, so odd or
    /// corrupt timestamps fail closed.
    pub async fn read(&self, id: &str) -> Result<Option<SessionRecord>, Error> {
        let record: Option<SessionRecord> = sqlx::query_as("SELECT * FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(record.filter(|r| !r.expired_at(Utc::now())))
    }

    /// Rewrite the identity on a live session and push its expiry out by
    /// one ttl. Returns `false` when the session is gone or expired; the
    /// caller then starts a new one instead.
    pub async fn update(&self, id: &str, name: &str, role: Role) -> Result<bool, Error> {
        if self.read(id).await?.is_none() {
            return Ok(false);
        }

        let expires_at = (Utc::now() + self.ttl).to_rfc3339();
        let result = sqlx::query("UPDATE sessions SET name = ?, role = ?, expires_at = ? WHERE id = ?")
            .bind(name)
            .bind(role.as_str())
            .bind(&expires_at)
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a session row. Deleting an unknown or already-deleted id is
    /// not an error.
    pub async fn destroy(&self, id: &str) -> Result<(), Error> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Delete every row whose expiry has passed, returning how many went.
    pub async fn purge_expired(&self) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now().to_rfc3339())
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}
