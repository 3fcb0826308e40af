//! Password hashing and route access decisions.

mod gate;
mod password;

pub use gate::{evaluate, Access, AccessLevel};
pub use password::{hash_password, verify_password};
