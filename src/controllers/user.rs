use std::sync::Arc;

use regex::Regex;

use crate::core::context::Context;
use crate::core::error::{self, Error};
use crate::store::UserRepository;
use crate::types::request::UserData;
use crate::types::user::{User, UserDraft};
use crate::utils::auth::TokenService;
use crate::utils::password;

#[derive(Clone)]
pub(crate) struct UserController {
    repository: Arc<dyn UserRepository>,
    tokens: TokenService,
    bcrypt_cost: u32,
    username_pattern: Regex,
    // checked against on unknown usernames so both login failures cost a verify
    dummy_hash: Arc<str>,
}

impl std::fmt::Debug for UserController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserController")
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("username_pattern", &self.username_pattern.as_str())
            .finish()
    }
}

impl UserController {
    pub(crate) fn new(
        repository: Arc<dyn UserRepository>,
        tokens: TokenService,
        bcrypt_cost: u32,
    ) -> Result<Self, error::ConfigError> {
        Ok(Self {
            repository,
            tokens,
            bcrypt_cost,
            username_pattern: Regex::new(r"^[a-zA-Z0-9_-]{3,20}$")?,
            dummy_hash: bcrypt::hash("microblog-dummy-password", bcrypt_cost)?.into(),
        })
    }

    pub(crate) async fn create(&self, ctx: &Context, data: UserData) -> Result<User, Error> {
        let draft = self.draft(data).await?;

        self.repository.create(ctx, draft).await
    }

    pub(crate) async fn get_all(&self, ctx: &Context) -> Result<Vec<User>, Error> {
        self.repository.get_all(ctx).await
    }

    pub(crate) async fn get_one(&self, ctx: &Context, id: i32) -> Result<User, Error> {
        self.repository.get_one(ctx, id).await
    }

    pub(crate) async fn update(&self, ctx: &Context, id: i32, data: UserData) -> Result<(), Error> {
        let draft = self.draft(data).await?;

        self.repository.update(ctx, id, draft).await
    }

    pub(crate) async fn delete(&self, ctx: &Context, id: i32) -> Result<(), Error> {
        self.repository.delete(ctx, id).await
    }

    /// Unknown usernames and wrong passwords are both `Unauthorized`.
    pub(crate) async fn login(
        &self,
        ctx: &Context,
        username: &str,
        password: &str,
    ) -> Result<String, Error> {
        let user = match self.repository.get_by_username(ctx, username).await {
            Ok(user) => Some(user),
            Err(Error::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        let hash: Arc<str> = match &user {
            Some(user) => user.password_hash.as_str().into(),
            None => self.dummy_hash.clone(),
        };
        let plaintext = password.to_owned();

        let matched = tokio::task::spawn_blocking(move || password::matches(&hash, &plaintext))
            .await
            .map_err(|_| Error::Internal)??;

        match user {
            Some(user) if matched => self.tokens.issue_for(user.id),
            _ => Err(Error::Unauthorized),
        }
    }

    async fn draft(&self, data: UserData) -> Result<UserDraft, Error> {
        if data.username.is_empty() {
            return Err(Error::Validation("Username is required".into()));
        }

        if !self.username_pattern.is_match(&data.username) {
            return Err(Error::Validation(
                "Username must be 3-20 letters, digits, '_' or '-'".into(),
            ));
        }

        if data.password.is_empty() {
            return Err(Error::Validation("Password is required".into()));
        }

        let cost = self.bcrypt_cost;
        let plaintext = data.password;

        let password_hash = tokio::task::spawn_blocking(move || password::hash(&plaintext, cost))
            .await
            .map_err(|_| Error::Internal)??;

        Ok(UserDraft {
            username: data.username,
            password_hash,
        })
    }
}
