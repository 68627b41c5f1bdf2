use axum::{
    http::{header, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{CreateUser, UpdateUser, UserView, CREATE_USER, UPDATE_USER},
    services,
};
use crate::{
    adverts::dto::AdvertisementView,
    error::ApiError,
    extract::{Id, JsonObject, Session},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(create_user))
        .route(
            "/user/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/user/:id/advertisements", get(list_user_advertisements))
}

#[instrument(skip_all)]
pub async fn create_user(
    mut session: Session,
    JsonObject(body): JsonObject,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<UserView>), ApiError> {
    let fields = CREATE_USER.validate(&body).map_err(ApiError::Validation)?;
    let uow = session.begin().await?;
    let user = services::create_user(uow, CreateUser::from_fields(&fields)).await?;
    let location = format!("/api/v1/user/{}", user.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(user.into()),
    ))
}

#[instrument(skip(session))]
pub async fn get_user(mut session: Session, Id(id): Id) -> Result<Json<UserView>, ApiError> {
    let user = services::get_user(session.begin().await?, id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(session, body))]
pub async fn update_user(
    mut session: Session,
    Id(id): Id,
    JsonObject(body): JsonObject,
) -> Result<Json<UserView>, ApiError> {
    let fields = UPDATE_USER.validate(&body).map_err(ApiError::Validation)?;
    let uow = session.begin().await?;
    let user = services::update_user(uow, id, UpdateUser::from_fields(&fields)).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(session))]
pub async fn delete_user(mut session: Session, Id(id): Id) -> Result<StatusCode, ApiError> {
    services::delete_user(session.begin().await?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(session))]
pub async fn list_user_advertisements(
    mut session: Session,
    Id(id): Id,
) -> Result<Json<Vec<AdvertisementView>>, ApiError> {
    let ads = services::list_user_advertisements(session.begin().await?, id).await?;
    Ok(Json(ads.into_iter().map(AdvertisementView::from).collect()))
}
