use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use crate::core::context::Context;
use crate::core::error::{ConfigError, Error};
use crate::store::{Entity, Repository, Store, UserRepository};
use crate::types::post::{Post, PostDraft};
use crate::types::user::{User, UserDraft};

/// Postgres-backed store. Expects the tables from `schema.sql`; the unique
/// and foreign-key constraints there are what make concurrent writes safe.
#[derive(Clone, Debug)]
pub(crate) struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub(crate) async fn connect(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, ConfigError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self, ctx: &Context) -> Result<(), Error> {
        ctx.run(async move {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        })
        .await
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl Repository<User> for PgStore {
    async fn create(&self, ctx: &Context, draft: UserDraft) -> Result<User, Error> {
        ctx.run(async move {
            let mut tx = self.pool.begin().await?;

            let user = sqlx::query(
                "INSERT INTO users (username, password_hash) VALUES ($1, $2)
                RETURNING id, username, password_hash, created_at;",
            )
            .bind(&draft.username)
            .bind(&draft.password_hash)
            .map(map_user)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;

            tx.commit().await?;

            Ok(user)
        })
        .await
    }

    async fn get_all(&self, ctx: &Context) -> Result<Vec<User>, Error> {
        ctx.run(async move {
            let users = sqlx::query(
                "SELECT id, username, password_hash, created_at FROM users ORDER BY id;",
            )
            .map(map_user)
            .fetch_all(&self.pool)
            .await?;

            Ok(users)
        })
        .await
    }

    async fn get_one(&self, ctx: &Context, id: i32) -> Result<User, Error> {
        ctx.run(async move {
            sqlx::query("SELECT id, username, password_hash, created_at FROM users WHERE id = $1;")
                .bind(id)
                .map(map_user)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(Error::NotFound(User::NAME))
        })
        .await
    }

    async fn update(&self, ctx: &Context, id: i32, draft: UserDraft) -> Result<(), Error> {
        ctx.run(async move {
            let mut tx = self.pool.begin().await?;

            let result =
                sqlx::query("UPDATE users SET username = $1, password_hash = $2 WHERE id = $3;")
                    .bind(&draft.username)
                    .bind(&draft.password_hash)
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_write_error)?;

            if result.rows_affected() == 0 {
                return Err(Error::NotFound(User::NAME));
            }

            tx.commit().await?;

            Ok(())
        })
        .await
    }

    async fn delete(&self, ctx: &Context, id: i32) -> Result<(), Error> {
        ctx.run(async move {
            let mut tx = self.pool.begin().await?;

            let result = sqlx::query("DELETE FROM users WHERE id = $1;")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                return Err(Error::NotFound(User::NAME));
            }

            tx.commit().await?;

            Ok(())
        })
        .await
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn get_by_username(&self, ctx: &Context, username: &str) -> Result<User, Error> {
        ctx.run(async move {
            sqlx::query(
                "SELECT id, username, password_hash, created_at FROM users WHERE username = $1;",
            )
            .bind(username)
            .map(map_user)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::NotFound(User::NAME))
        })
        .await
    }
}

#[async_trait]
impl Repository<Post> for PgStore {
    async fn create(&self, ctx: &Context, draft: PostDraft) -> Result<Post, Error> {
        ctx.run(async move {
            let mut tx = self.pool.begin().await?;

            let post = sqlx::query(
                "INSERT INTO posts (user_id, content) VALUES ($1, $2)
                RETURNING id, user_id, content, created_at;",
            )
            .bind(draft.user_id)
            .bind(&draft.content)
            .map(map_post)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;

            tx.commit().await?;

            Ok(post)
        })
        .await
    }

    async fn get_all(&self, ctx: &Context) -> Result<Vec<Post>, Error> {
        ctx.run(async move {
            let posts =
                sqlx::query("SELECT id, user_id, content, created_at FROM posts ORDER BY id;")
                    .map(map_post)
                    .fetch_all(&self.pool)
                    .await?;

            Ok(posts)
        })
        .await
    }

    async fn get_one(&self, ctx: &Context, id: i32) -> Result<Post, Error> {
        ctx.run(async move {
            sqlx::query("SELECT id, user_id, content, created_at FROM posts WHERE id = $1;")
                .bind(id)
                .map(map_post)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(Error::NotFound(Post::NAME))
        })
        .await
    }

    async fn update(&self, ctx: &Context, id: i32, draft: PostDraft) -> Result<(), Error> {
        ctx.run(async move {
            let mut tx = self.pool.begin().await?;

            let result = sqlx::query("UPDATE posts SET user_id = $1, content = $2 WHERE id = $3;")
                .bind(draft.user_id)
                .bind(&draft.content)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_write_error)?;

            if result.rows_affected() == 0 {
                return Err(Error::NotFound(Post::NAME));
            }

            tx.commit().await?;

            Ok(())
        })
        .await
    }

    async fn delete(&self, ctx: &Context, id: i32) -> Result<(), Error> {
        ctx.run(async move {
            let mut tx = self.pool.begin().await?;

            let result = sqlx::query("DELETE FROM posts WHERE id = $1;")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                return Err(Error::NotFound(Post::NAME));
            }

            tx.commit().await?;

            Ok(())
        })
        .await
    }
}

fn map_write_error(e: sqlx::Error) -> Error {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => Error::UserAlreadyExists,
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            Error::Validation("Referenced user does not exist".into())
        }
        e => Error::Sql(e),
    }
}

fn map_user(row: PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    }
}

fn map_post(row: PgRow) -> Post {
    Post {
        id: row.get("id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        created_at: row.get("created_at"),
    }
}
