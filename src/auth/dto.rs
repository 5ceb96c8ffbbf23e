use serde::{Deserialize, Serialize};

use crate::profile::dto::UserProfile;

/// Request body for both `/auth/login` and `/auth/register`.
#[derive(Debug, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Successful login/register payload.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: Option<String>,
    pub token: String,
    pub user: UserProfile,
}

/// Authentication state held by the session store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user_email: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Broadcast to the presentation layer on every session transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { email: String },
    SignedOut,
    /// The backend rejected the token; navigate to the login flow.
    ForcedLogout,
}
