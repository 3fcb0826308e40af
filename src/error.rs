//! Unified error handling for the signup and login flows.
//!
//! All user-visible failures map to plain-text responses carrying fixed
//! messages; store and hasher internals are logged server-side and never
//! reach the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Message shown when a store or hasher failure interrupts a write path.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum Error {
    /// Input failed schema validation; carries the first violated rule's message.
    #[error("{0}")]
    Validation(String),

    /// Unknown email or wrong password. One message for both, so a response
    /// never reveals whether an email is registered.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// Signup attempt with an email that already has a record.
    #[error("Email already in use.")]
    DuplicateEmail,

    /// Role change aimed at an email with no user record.
    #[error("no user with email {0}")]
    UserNotFound(String),

    /// Database failure.
    #[error(transparent)]
    Store(#[from] sqlx::Error),

    /// Password hasher failure.
    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),
}

impl Error {
    /// Whether the error's message is meant for the user verbatim.
    fn user_visible(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::InvalidCredentials | Error::DuplicateEmail
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Form failures answer 200 with a short plain-text message; the
        // browser stays on the submitted page rather than an error page.
        if self.user_visible() {
            (StatusCode::OK, self.to_string()).into_response()
        } else {
            tracing::error!(error = %self, "request failed");
            (StatusCode::OK, GENERIC_FAILURE).into_response()
        }
    }
}
