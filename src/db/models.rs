//! User and session models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account role stored on the user row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Get the role as a Role enum
    pub fn role_enum(&self) -> Role {
        Role::from(self.role.clone())
    }
}

/// A server-side session row. `name` and `role` are snapshots taken at
/// login time; they stay as written until the next explicit session write,
/// even if the user row changes underneath.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionRecord {
    pub id: String,
    pub name: Option<String>,
    pub role: Option<String>,
    pub expires_at: String,
    pub created_at: String,
}

impl SessionRecord {
    /// Whether this session carries a signed-in identity.
    pub fn is_authenticated(&self) -> bool {
        self.name.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.is_authenticated() && matches!(self.role_enum(), Some(Role::Admin))
    }

    /// Get the role as a Role enum; unknown strings fall back to [`Role::User`].
    pub fn role_enum(&self) -> Option<Role> {
        self.role.clone().map(Role::from)
    }

    /// True once the stored expiry is at or before `now`. An unparseable
    /// expiry counts as expired.
    pub fn expired_at(&self, now: DateTime<Utc>) -> bool {
        match DateTime::parse_from_rfc3339(&self.expires_at) {
            Ok(ts) => ts.with_timezone(&Utc) <= now,
            Err(_) => true,
        }
    }
}
