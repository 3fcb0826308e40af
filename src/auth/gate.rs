//! Access decisions for protected routes.
//!
//! The decision looks only at the session row as stored. A role change on
//! the user row does not reach here until the session is rewritten.

use crate::db::SessionRecord;

/// Minimum identity a route requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Anonymous,
    Authenticated,
    Admin,
}

/// Outcome of checking a session against a required level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// No usable identity; the visitor belongs on the login page.
    LoginRequired,
    /// Signed in but not allowed. A refusal, never a redirect.
    Forbidden,
}

pub fn evaluate(session: Option<&SessionRecord>, required: AccessLevel) -> Access {
    let authenticated = session.map(SessionRecord::is_authenticated).unwrap_or(false);

    match required {
        AccessLevel::Anonymous => Access::Granted,
        AccessLevel::Authenticated => {
            if authenticated {
                Access::Granted
            } else {
                Access::LoginRequired
            }
        }
        AccessLevel::Admin => {
            if !authenticated {
                Access::LoginRequired
            } else if session.map(SessionRecord::is_admin).unwrap_or(false) {
                Access::Granted
            } else {
                Access::Forbidden
            }
        }
    }
}
