use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::controllers::post::PostController;
use crate::controllers::user::UserController;
use crate::core::error::ConfigError;
use crate::store::{Repository, Store, UserRepository};
use crate::types::post::Post;
use crate::utils::auth::TokenService;

#[derive(Clone)]
pub(crate) struct Settings {
    pub(crate) secret: String,
    pub(crate) token_ttl: Duration,
    pub(crate) request_timeout: Duration,
    pub(crate) bcrypt_cost: u32,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) tokens: TokenService,
    pub(crate) user_controller: UserController,
    pub(crate) post_controller: PostController,
    pub(crate) request_timeout: Duration,
    pub(crate) shutdown: watch::Receiver<bool>,
}

impl AppState {
    pub(crate) fn new<B>(
        backend: Arc<B>,
        settings: Settings,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self, ConfigError>
    where
        B: Store + UserRepository + Repository<Post> + 'static,
    {
        let tokens = TokenService::new(&settings.secret, settings.token_ttl)?;

        Ok(AppState {
            store: backend.clone(),
            user_controller: UserController::new(
                backend.clone(),
                tokens.clone(),
                settings.bcrypt_cost,
            )?,
            post_controller: PostController::new(backend),
            tokens,
            request_timeout: settings.request_timeout,
            shutdown,
        })
    }
}
