use axum::Json;
use axum::extract::{Extension, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use tracing::instrument;

use crate::core::context::Context;
use crate::core::error::Error;
use crate::core::state::AppState;
use crate::routes::extract::{Path, Payload};
use crate::types::request;
use crate::types::response;
use crate::types::user::AuthorizedUser;

#[instrument(skip(state, ctx))]
pub(crate) async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthorizedUser>,
    ctx: Context,
    Payload(params): Payload<request::PostData>,
) -> Result<impl IntoResponse, Error> {
    let post = state.post_controller.create(&ctx, params).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/posts/{}", post.id))],
        Json(response::PostBody { post }),
    ))
}

#[instrument(skip(state, ctx))]
pub(crate) async fn get_all(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthorizedUser>,
    ctx: Context,
) -> Result<Json<response::Posts>, Error> {
    let posts = state.post_controller.get_all(&ctx).await?;

    Ok(Json(response::Posts { posts }))
}

#[instrument(skip(state, ctx))]
pub(crate) async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthorizedUser>,
    ctx: Context,
    Path(id): Path<i32>,
) -> Result<Json<response::PostBody>, Error> {
    let post = state.post_controller.get_one(&ctx, id).await?;

    Ok(Json(response::PostBody { post }))
}

#[instrument(skip(state, ctx, params))]
pub(crate) async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthorizedUser>,
    ctx: Context,
    Path(id): Path<i32>,
    Payload(params): Payload<request::PostData>,
) -> Result<Json<response::Empty>, Error> {
    state.post_controller.update(&ctx, id, params).await?;

    Ok(Json(response::Empty::default()))
}

#[instrument(skip(state, ctx))]
pub(crate) async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthorizedUser>,
    ctx: Context,
    Path(id): Path<i32>,
) -> Result<Json<response::Empty>, Error> {
    state.post_controller.delete(&ctx, id).await?;

    Ok(Json(response::Empty::default()))
}
