// Members-area UI module
// Askama templates rendered server-side; the session id travels in a
// signed cookie, everything else stays in the session store.

mod templates;
mod validation;

use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use crate::CookieKey;

type SignedCookieJar = axum_extra::extract::SignedCookieJar<CookieKey>;
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::auth::{self, Access, AccessLevel};
use crate::db::{Role, SessionRecord};
use crate::error::Error;
use crate::AppState;

pub use templates::*;

// Session id cookie name
const SESSION_COOKIE: &str = "doorman_session";

// Body sent with 403 responses on the admin routes
const ACCESS_DENIED: &str = "Access denied. Admins only.";

// Decorative images the members page picks from
const MEMBER_IMAGES: [&str; 3] = ["pic1.svg", "pic2.svg", "pic3.svg"];

pub fn create_router(state: Arc<AppState>) -> Router {
    let public_dir = state.config.server.public_dir.clone();

    Router::new()
        // Public routes
        .route("/", get(home))
        .route("/login", get(login_page))
        .route("/login", post(login_submit))
        .route("/signup", get(signup_page))
        .route("/signup", post(signup_submit))
        .route("/logout", get(logout))
        .route("/health", get(health_check))
        // Protected routes
        .route("/members", get(members_page))
        .route("/admin", get(admin_page))
        .route("/admin/promote/:email", get(promote))
        .route("/admin/demote/:email", get(demote))
        .nest_service("/public", ServeDir::new(public_dir))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

// Helper to render templates and handle errors
fn render_template<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Template error: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

/// Resolve the session behind the request's cookie, if any. A store error
/// here degrades to anonymous rather than failing the request.
async fn current_session(state: &AppState, jar: &SignedCookieJar) -> Option<SessionRecord> {
    let cookie = jar.get(SESSION_COOKIE)?;
    match state.sessions.read(cookie.value()).await {
        Ok(session) => session,
        Err(e) => {
            warn!("Session lookup failed, treating request as anonymous: {}", e);
            None
        }
    }
}

/// Write the signed-in identity into the visitor's session, reusing a live
/// session when the cookie points at one, and hand back the jar with the
/// cookie set. A store failure here fails the enclosing login or signup.
async fn start_session(
    state: &AppState,
    jar: SignedCookieJar,
    name: &str,
    role: Role,
) -> Result<SignedCookieJar, Error> {
    let mut session_id = None;
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let id = cookie.value().to_string();
        if state.sessions.update(&id, name, role).await? {
            session_id = Some(id);
        }
    }

    let id = match session_id {
        Some(id) => id,
        None => state.sessions.create(name, role).await?,
    };

    let cookie = Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(
            state.config.session.ttl_minutes as i64,
        ))
        .build();

    Ok(jar.add(cookie))
}

/// Gate for the admin routes: the resolved session on success, the
/// ready-made rejection response otherwise.
async fn require_admin(
    state: &AppState,
    jar: &SignedCookieJar,
) -> Result<SessionRecord, Response> {
    let session = current_session(state, jar).await;
    match (auth::evaluate(session.as_ref(), AccessLevel::Admin), session) {
        (Access::Granted, Some(session)) => Ok(session),
        (Access::Forbidden, _) => {
            Err((StatusCode::FORBIDDEN, ACCESS_DENIED).into_response())
        }
        _ => Err(Redirect::to("/login").into_response()),
    }
}

// Home page
async fn home(State(state): State<Arc<AppState>>, jar: SignedCookieJar) -> Response {
    let session = current_session(&state, &jar).await;
    render_template(HomeTemplate {
        nav: Nav::from_session(session.as_ref()),
    })
}

// Login page
async fn login_page(State(state): State<Arc<AppState>>, jar: SignedCookieJar) -> Response {
    let session = current_session(&state, &jar).await;
    render_template(LoginTemplate {
        nav: Nav::from_session(session.as_ref()),
    })
}

#[derive(Deserialize)]
struct LoginForm {
    email: String,
    password: String,
}

// Login submit
async fn login_submit(
    State(state): State<Arc<AppState>>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, Error> {
    validation::validate_login(&form.email, &form.password).map_err(Error::Validation)?;

    let user = state
        .users
        .find_by_email(&form.email)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    if !auth::verify_password(&form.password, &user.password_hash) {
        return Err(Error::InvalidCredentials);
    }

    let jar = start_session(&state, jar, &user.name, user.role_enum()).await?;
    info!("User logged in: {}", user.email);

    Ok((jar, Redirect::to("/members")).into_response())
}

// Signup page
async fn signup_page(State(state): State<Arc<AppState>>, jar: SignedCookieJar) -> Response {
    let session = current_session(&state, &jar).await;
    render_template(SignupTemplate {
        nav: Nav::from_session(session.as_ref()),
    })
}

#[derive(Deserialize)]
struct SignupForm {
    name: String,
    email: String,
    password: String,
}

// Signup submit
async fn signup_submit(
    State(state): State<Arc<AppState>>,
    jar: SignedCookieJar,
    Form(form): Form<SignupForm>,
) -> Result<Response, Error> {
    validation::validate_signup(&form.name, &form.email, &form.password)
        .map_err(Error::Validation)?;

    let password_hash = auth::hash_password(&form.password, state.config.auth.password_cost)?;
    let user = state
        .users
        .create(form.name.trim(), &form.email, &password_hash, Role::User)
        .await?;
    info!("New user signed up: {}", user.email);

    let jar = start_session(&state, jar, &user.name, user.role_enum()).await?;
    Ok((jar, Redirect::to("/members")).into_response())
}

// Members area
async fn members_page(State(state): State<Arc<AppState>>, jar: SignedCookieJar) -> Response {
    let session = current_session(&state, &jar).await;
    match auth::evaluate(session.as_ref(), AccessLevel::Authenticated) {
        Access::Granted => {}
        _ => return Redirect::to("/login").into_response(),
    }

    let nav = Nav::from_session(session.as_ref());
    let name = session.and_then(|s| s.name).unwrap_or_default();
    let image = MEMBER_IMAGES[rand::rng().random_range(0..MEMBER_IMAGES.len())];

    render_template(MembersTemplate {
        nav,
        name,
        image: image.to_string(),
    })
}

// Admin panel
async fn admin_page(
    State(state): State<Arc<AppState>>,
    jar: SignedCookieJar,
) -> Result<Response, Error> {
    let session = match require_admin(&state, &jar).await {
        Ok(session) => session,
        Err(rejection) => return Ok(rejection),
    };

    let users = state.users.list_all().await?;
    Ok(render_template(AdminTemplate {
        nav: Nav::from_session(Some(&session)),
        users: users.into_iter().map(UserRow::from).collect(),
    }))
}

/// Shared implementation of the promote and demote routes. An unknown
/// email is logged and skipped; the admin still lands back on the roster.
async fn change_role(
    state: &AppState,
    jar: &SignedCookieJar,
    email: &str,
    role: Role,
) -> Result<Response, Error> {
    if let Err(rejection) = require_admin(state, jar).await {
        return Ok(rejection);
    }

    match state.users.set_role(email, role).await {
        Ok(()) => info!("Set role {} for {}", role, email),
        Err(Error::UserNotFound(email)) => {
            warn!("Role change requested for unknown email {}", email);
        }
        Err(e) => return Err(e),
    }

    Ok(Redirect::to("/admin").into_response())
}

// Promote user to admin
async fn promote(
    State(state): State<Arc<AppState>>,
    jar: SignedCookieJar,
    Path(email): Path<String>,
) -> Result<Response, Error> {
    change_role(&state, &jar, &email, Role::Admin).await
}

// Demote user back to regular user
async fn demote(
    State(state): State<Arc<AppState>>,
    jar: SignedCookieJar,
    Path(email): Path<String>,
) -> Result<Response, Error> {
    change_role(&state, &jar, &email, Role::User).await
}

// Logout. Destroys whatever session the cookie points at; a store error
// is logged and the cookie cleared regardless.
async fn logout(State(state): State<Arc<AppState>>, jar: SignedCookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Err(e) = state.sessions.destroy(cookie.value()).await {
            error!("Failed to destroy session: {}", e);
        }
    }

    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    (jar, Redirect::to("/")).into_response()
}

// 404 fallback
async fn not_found(State(state): State<Arc<AppState>>, jar: SignedCookieJar) -> Response {
    let session = current_session(&state, &jar).await;
    let template = NotFoundTemplate {
        nav: Nav::from_session(session.as_ref()),
    };
    match template.render() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            error!("Template error: {}", e);
            (StatusCode::NOT_FOUND, "404 - Page Not Found").into_response()
        }
    }
}
