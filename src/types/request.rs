use serde::Deserialize;

#[derive(Deserialize)]
pub(crate) struct LoginData {
    pub(crate) username: String,
    pub(crate) password: String,
}

/// Body of `POST /users` and `PUT /users/{id}`.
#[derive(Deserialize)]
pub(crate) struct UserData {
    #[serde(default)]
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PostData {
    pub(crate) user_id: i32,
    #[serde(default)]
    pub(crate) content: String,
}
