use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::core::context::Context;
use crate::core::error::Error;
use crate::store::{Entity, Repository, Store, UserRepository};
use crate::types::post::{Post, PostDraft};
use crate::types::user::{User, UserDraft};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    posts: BTreeMap<i32, Post>,
    last_user_id: i32,
    last_post_id: i32,
}

impl Tables {
    fn username_taken(&self, username: &str, except: Option<i32>) -> bool {
        self.users
            .values()
            .any(|user| user.username == username && Some(user.id) != except)
    }

    fn check_author(&self, user_id: i32) -> Result<(), Error> {
        if self.users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(Error::Validation(format!("User {user_id} does not exist")))
        }
    }
}

/// In-process store for tests and local runs. Each operation holds the table
/// lock for its whole check-and-write, so constraint checks are atomic.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self, ctx: &Context) -> Result<(), Error> {
        ctx.run(async move { Ok(()) }).await
    }

    async fn close(&self) {}
}

#[async_trait]
impl Repository<User> for MemoryStore {
    async fn create(&self, ctx: &Context, draft: UserDraft) -> Result<User, Error> {
        ctx.run(async move {
            let mut tables = self.tables.write().await;

            if tables.username_taken(&draft.username, None) {
                return Err(Error::UserAlreadyExists);
            }

            tables.last_user_id += 1;

            let user = User {
                id: tables.last_user_id,
                username: draft.username,
                password_hash: draft.password_hash,
                created_at: Utc::now(),
            };

            tables.users.insert(user.id, user.clone());

            Ok(user)
        })
        .await
    }

    async fn get_all(&self, ctx: &Context) -> Result<Vec<User>, Error> {
        ctx.run(async move { Ok(self.tables.read().await.users.values().cloned().collect()) })
            .await
    }

    async fn get_one(&self, ctx: &Context, id: i32) -> Result<User, Error> {
        ctx.run(async move {
            self.tables
                .read()
                .await
                .users
                .get(&id)
                .cloned()
                .ok_or(Error::NotFound(User::NAME))
        })
        .await
    }

    async fn update(&self, ctx: &Context, id: i32, draft: UserDraft) -> Result<(), Error> {
        ctx.run(async move {
            let mut tables = self.tables.write().await;

            if !tables.users.contains_key(&id) {
                return Err(Error::NotFound(User::NAME));
            }

            if tables.username_taken(&draft.username, Some(id)) {
                return Err(Error::UserAlreadyExists);
            }

            if let Some(user) = tables.users.get_mut(&id) {
                user.username = draft.username;
                user.password_hash = draft.password_hash;
            }

            Ok(())
        })
        .await
    }

    async fn delete(&self, ctx: &Context, id: i32) -> Result<(), Error> {
        ctx.run(async move {
            let mut tables = self.tables.write().await;

            tables
                .users
                .remove(&id)
                .ok_or(Error::NotFound(User::NAME))?;

            tables.posts.retain(|_, post| post.user_id != id);

            Ok(())
        })
        .await
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn get_by_username(&self, ctx: &Context, username: &str) -> Result<User, Error> {
        ctx.run(async move {
            self.tables
                .read()
                .await
                .users
                .values()
                .find(|user| user.username == username)
                .cloned()
                .ok_or(Error::NotFound(User::NAME))
        })
        .await
    }
}

#[async_trait]
impl Repository<Post> for MemoryStore {
    async fn create(&self, ctx: &Context, draft: PostDraft) -> Result<Post, Error> {
        ctx.run(async move {
            let mut tables = self.tables.write().await;

            tables.check_author(draft.user_id)?;

            tables.last_post_id += 1;

            let post = Post {
                id: tables.last_post_id,
                user_id: draft.user_id,
                content: draft.content,
                created_at: Utc::now(),
            };

            tables.posts.insert(post.id, post.clone());

            Ok(post)
        })
        .await
    }

    async fn get_all(&self, ctx: &Context) -> Result<Vec<Post>, Error> {
        ctx.run(async move { Ok(self.tables.read().await.posts.values().cloned().collect()) })
            .await
    }

    async fn get_one(&self, ctx: &Context, id: i32) -> Result<Post, Error> {
        ctx.run(async move {
            self.tables
                .read()
                .await
                .posts
                .get(&id)
                .cloned()
                .ok_or(Error::NotFound(Post::NAME))
        })
        .await
    }

    async fn update(&self, ctx: &Context, id: i32, draft: PostDraft) -> Result<(), Error> {
        ctx.run(async move {
            let mut tables = self.tables.write().await;

            if !tables.posts.contains_key(&id) {
                return Err(Error::NotFound(Post::NAME));
            }

            tables.check_author(draft.user_id)?;

            if let Some(post) = tables.posts.get_mut(&id) {
                post.user_id = draft.user_id;
                post.content = draft.content;
            }

            Ok(())
        })
        .await
    }

    async fn delete(&self, ctx: &Context, id: i32) -> Result<(), Error> {
        ctx.run(async move {
            self.tables
                .write()
                .await
                .posts
                .remove(&id)
                .map(|_| ())
                .ok_or(Error::NotFound(Post::NAME))
        })
        .await
    }
}
