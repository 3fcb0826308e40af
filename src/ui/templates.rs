// Askama template definitions

use askama::Template;

use crate::db::{Role, SessionRecord, User};

/// Navigation state shared by every page.
pub struct Nav {
    pub name: Option<String>,
    pub is_admin: bool,
}

impl Nav {
    pub fn anonymous() -> Self {
        Self {
            name: None,
            is_admin: false,
        }
    }

    pub fn from_session(session: Option<&SessionRecord>) -> Self {
        match session {
            Some(s) if s.is_authenticated() => Self {
                name: s.name.clone(),
                is_admin: s.is_admin(),
            },
            _ => Self::anonymous(),
        }
    }
}

// User row for the admin table (no password hash anywhere near the view)
pub struct UserRow {
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_admin: bool,
}

impl From<User> for UserRow {
    fn from(user: User) -> Self {
        let is_admin = user.role_enum() == Role::Admin;
        Self {
            name: user.name,
            email: user.email,
            role: user.role,
            is_admin,
        }
    }
}

// Home page template
#[derive(Template)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub nav: Nav,
}

// Login form template
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
}

// Signup form template
#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub nav: Nav,
}

// Members area template
#[derive(Template)]
#[template(path = "members.html")]
pub struct MembersTemplate {
    pub nav: Nav,
    pub name: String,
    pub image: String,
}

// Admin panel template
#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminTemplate {
    pub nav: Nav,
    pub users: Vec<UserRow>,
}

// 404 template
#[derive(Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub nav: Nav,
}
