use serde::Serialize;

use crate::types::post::Post;
use crate::types::user::User;

#[derive(Serialize)]
pub(crate) struct UserBody {
    pub(crate) user: User,
}

#[derive(Serialize)]
pub(crate) struct Users {
    pub(crate) users: Vec<User>,
}

#[derive(Serialize)]
pub(crate) struct PostBody {
    pub(crate) post: Post,
}

#[derive(Serialize)]
pub(crate) struct Posts {
    pub(crate) posts: Vec<Post>,
}

#[derive(Serialize)]
pub(crate) struct Login {
    pub(crate) token: String,
}

impl Login {
    pub(crate) fn new(token: String) -> Self {
        Self { token }
    }
}

#[derive(Default, Serialize)]
pub(crate) struct Empty {}
