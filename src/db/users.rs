//! User rows: lookup, creation, role changes.

use chrono::Utc;
use tracing::info;

use crate::db::{DbPool, Role, User};
use crate::error::Error;

fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.message().contains("UNIQUE constraint failed"),
        _ => false,
    }
}

/// Queries over the users table. Cheap to clone; the pool is shared.
#[derive(Clone)]
pub struct UserStore {
    db: DbPool,
}

impl UserStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Exact-match lookup; emails are stored and compared case-sensitively.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        Ok(user)
    }

    /// Insert a new user. When two requests race on the same email the
    /// UNIQUE index decides; the loser gets [`Error::DuplicateEmail`].
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<User, Error> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, name, role, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(role.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::DuplicateEmail
            } else {
                Error::Store(e)
            }
        })?;

        Ok(User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            name: name.to_string(),
            role: role.as_str().to_string(),
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Set the role on a user row. Sessions opened before this call keep
    /// the role they were written with.
    pub async fn set_role(&self, email: &str, role: Role) -> Result<(), Error> {
        let result = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE email = ?")
            .bind(role.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(email)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::UserNotFound(email.to_string()));
        }
        Ok(())
    }

    /// Full roster for the admin page, oldest account first.
    pub async fn list_all(&self) -> Result<Vec<User>, Error> {
        let users = sqlx::query_as("SELECT * FROM users ORDER BY created_at, email")
            .fetch_all(&self.db)
            .await?;
        Ok(users)
    }

    /// Create the configured admin account if its email is still free.
    /// An existing row wins, whatever its role or password.
    pub async fn ensure_admin(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<(), Error> {
        match self.create(name, email, password_hash, Role::Admin).await {
            Ok(user) => {
                info!("Created admin user {}", user.email);
                Ok(())
            }
            Err(Error::DuplicateEmail) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn store() -> UserStore {
        UserStore::new(test_pool().await)
    }

    #[tokio::test]
    async fn create_and_find_roundtrip() {
        let store = store().await;
        let created = store
            .create("Ann", "ann@example.com", "$2b$04$hash", Role::User)
            .await
            .unwrap();
        assert_eq!(created.role_enum(), Role::User);

        let found = store.find_by_email("ann@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.name, "Ann");
        assert_eq!(found.password_hash, "$2b$04$hash");
    }

    #[tokio::test]
    async fn find_is_case_sensitive() {
        let store = store().await;
        store
            .create("Ann", "ann@example.com", "h", Role::User)
            .await
            .unwrap();
        assert!(store.find_by_email("Ann@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let store = store().await;
        store
            .create("Ann", "ann@example.com", "h1", Role::User)
            .await
            .unwrap();
        let err = store
            .create("Other Ann", "ann@example.com", "h2", Role::User)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateEmail));
    }

    #[tokio::test]
    async fn racing_signups_leave_exactly_one_row() {
        let store = store().await;
        let (a, b) = tokio::join!(
            store.create("Ann", "ann@example.com", "h1", Role::User),
            store.create("Ann", "ann@example.com", "h2", Role::User),
        );
        assert!(a.is_ok() != b.is_ok());
        let loser = if a.is_err() { a } else { b };
        assert!(matches!(loser.unwrap_err(), Error::DuplicateEmail));
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn set_role_updates_only_the_row() {
        let store = store().await;
        store
            .create("Ann", "ann@example.com", "h", Role::User)
            .await
            .unwrap();
        store.set_role("ann@example.com", Role::Admin).await.unwrap();
        let user = store.find_by_email("ann@example.com").await.unwrap().unwrap();
        assert_eq!(user.role_enum(), Role::Admin);

        store.set_role("ann@example.com", Role::User).await.unwrap();
        let user = store.find_by_email("ann@example.com").await.unwrap().unwrap();
        assert_eq!(user.role_enum(), Role::User);
    }

    #[tokio::test]
    async fn set_role_unknown_email_errors() {
        let store = store().await;
        let err = store.set_role("ghost@example.com", Role::Admin).await.unwrap_err();
        assert!(matches!(err, Error::UserNotFound(_)));
    }

    #[tokio::test]
    async fn ensure_admin_is_idempotent() {
        let store = store().await;
        store.ensure_admin("Root", "root@example.com", "h1").await.unwrap();
        // Second run leaves the original row untouched.
        store.ensure_admin("Root", "root@example.com", "h2").await.unwrap();

        let user = store.find_by_email("root@example.com").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "h1");
        assert_eq!(user.role_enum(), Role::Admin);
    }
}
