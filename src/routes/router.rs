use axum::extract::{MatchedPath, Request, State};
use axum::http::StatusCode;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info_span;

use crate::core::context::Context;
use crate::core::state::AppState;
use crate::routes::{posts, users};
use crate::utils;

pub(crate) fn routes(state: AppState) -> Router {
    let authorized_routes = Router::new()
        .route("/users", get(users::get_all))
        .route(
            "/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/posts", get(posts::get_all).post(posts::create))
        .route(
            "/posts/{id}",
            get(posts::get).put(posts::update).delete(posts::delete),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            utils::auth::authorize,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/users", post(users::create))
        .route("/users/login", post(users::login))
        .merge(authorized_routes)
        .with_state(state)
        .layer(ServiceBuilder::new().layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                info_span!(
                    "request",
                    method = ?request.method(),
                    matched_path,
                )
            }),
        ))
}

async fn health(State(state): State<AppState>, ctx: Context) -> (StatusCode, &'static str) {
    match state.store.ping(&ctx).await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::warn!("store ping failed: {:?}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable")
        }
    }
}
