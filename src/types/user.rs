use chrono::{DateTime, Utc};
use serde::Serialize;

pub(crate) type Username = String;

#[derive(Clone, Serialize)]
pub(crate) struct User {
    pub(crate) id: i32,
    pub(crate) username: Username,
    #[serde(skip_serializing)]
    pub(crate) password_hash: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// What the store writes for a user. The password is already hashed.
#[derive(Clone)]
pub(crate) struct UserDraft {
    pub(crate) username: Username,
    pub(crate) password_hash: String,
}

/// Subject of a verified token, attached to the request by the auth gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AuthorizedUser {
    pub(crate) id: i32,
}
