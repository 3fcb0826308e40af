pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod ui;

pub use db::DbPool;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use std::sync::Arc;

use config::Config;
use db::{SessionStore, UserStore};

pub struct AppState {
    pub config: Config,
    pub users: UserStore,
    pub sessions: SessionStore,
    cookie_key: Key,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        // Key::from wants at least 64 bytes; a Sha512 digest is exactly
        // that, whatever length the configured secret has.
        let cookie_key = Key::from(Sha512::digest(config.session.secret.as_bytes()).as_slice());
        let users = UserStore::new(db.clone());
        let sessions = SessionStore::new(db, config.session.ttl_minutes);
        Self {
            config,
            users,
            sessions,
            cookie_key,
        }
    }
}

// Local wrapper around the signing key: the orphan rule forbids
// implementing the foreign `FromRef` for the foreign `Key` on
// `Arc<AppState>`, so the jar is parameterized over this type instead.
#[derive(Clone)]
pub struct CookieKey(Key);

impl From<CookieKey> for Key {
    fn from(key: CookieKey) -> Self {
        key.0
    }
}

impl FromRef<Arc<AppState>> for CookieKey {
    fn from_ref(state: &Arc<AppState>) -> Self {
        CookieKey(state.cookie_key.clone())
    }
}
