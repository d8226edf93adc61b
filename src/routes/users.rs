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

#[instrument(skip_all, fields(username = %params.username))]
pub(crate) async fn create(
    State(state): State<AppState>,
    ctx: Context,
    Payload(params): Payload<request::UserData>,
) -> Result<impl IntoResponse, Error> {
    let user = state.user_controller.create(&ctx, params).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/users/{}", user.id))],
        Json(response::UserBody { user }),
    ))
}

#[instrument(skip_all, fields(username = %params.username))]
pub(crate) async fn login(
    State(state): State<AppState>,
    ctx: Context,
    Payload(params): Payload<request::LoginData>,
) -> Result<Json<response::Login>, Error> {
    let token = state
        .user_controller
        .login(&ctx, &params.username, &params.password)
        .await?;

    Ok(Json(response::Login::new(token)))
}

#[instrument(skip_all, fields(caller = caller.id))]
pub(crate) async fn get_all(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthorizedUser>,
    ctx: Context,
) -> Result<Json<response::Users>, Error> {
    let users = state.user_controller.get_all(&ctx).await?;

    Ok(Json(response::Users { users }))
}

#[instrument(skip(state, ctx))]
pub(crate) async fn get(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthorizedUser>,
    ctx: Context,
    Path(id): Path<i32>,
) -> Result<Json<response::UserBody>, Error> {
    let user = state.user_controller.get_one(&ctx, id).await?;

    Ok(Json(response::UserBody { user }))
}

#[instrument(skip(state, ctx, params))]
pub(crate) async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthorizedUser>,
    ctx: Context,
    Path(id): Path<i32>,
    Payload(params): Payload<request::UserData>,
) -> Result<Json<response::Empty>, Error> {
    state.user_controller.update(&ctx, id, params).await?;

    Ok(Json(response::Empty::default()))
}

#[instrument(skip(state, ctx))]
pub(crate) async fn delete(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthorizedUser>,
    ctx: Context,
    Path(id): Path<i32>,
) -> Result<Json<response::Empty>, Error> {
    state.user_controller.delete(&ctx, id).await?;

    Ok(Json(response::Empty::default()))
}
