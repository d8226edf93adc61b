pub(crate) mod memory;
pub(crate) mod postgres;

use async_trait::async_trait;

use crate::core::context::Context;
use crate::core::error::Error;
use crate::types::post::{Post, PostDraft};
use crate::types::user::{User, UserDraft};

/// A record kind the repository can persist.
pub(crate) trait Entity: Clone + Send + Sync + 'static {
    type Draft: Send + 'static;

    const NAME: &'static str;
}

impl Entity for User {
    type Draft = UserDraft;

    const NAME: &'static str = "User";
}

impl Entity for Post {
    type Draft = PostDraft;

    const NAME: &'static str = "Post";
}

/// CRUD over one entity kind. Constraint checks (unique usernames, post
/// authors) are the store's job and surface as typed errors.
#[async_trait]
pub(crate) trait Repository<T: Entity>: Send + Sync {
    async fn create(&self, ctx: &Context, draft: T::Draft) -> Result<T, Error>;

    /// Ascending id order; empty when there is nothing stored.
    async fn get_all(&self, ctx: &Context) -> Result<Vec<T>, Error>;

    async fn get_one(&self, ctx: &Context, id: i32) -> Result<T, Error>;

    /// Overwrites every mutable field of the record.
    async fn update(&self, ctx: &Context, id: i32, draft: T::Draft) -> Result<(), Error>;

    async fn delete(&self, ctx: &Context, id: i32) -> Result<(), Error>;
}

#[async_trait]
pub(crate) trait UserRepository: Repository<User> {
    async fn get_by_username(&self, ctx: &Context, username: &str) -> Result<User, Error>;
}

/// Connection-level capabilities of a backend.
#[async_trait]
pub(crate) trait Store: std::fmt::Debug + Send + Sync {
    async fn ping(&self, ctx: &Context) -> Result<(), Error>;

    async fn close(&self);
}
