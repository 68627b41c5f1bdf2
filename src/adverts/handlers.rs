use axum::{
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{
        AdvertisementView, CreateAdvertisement, UpdateAdvertisement, CREATE_ADVERTISEMENT,
        UPDATE_ADVERTISEMENT,
    },
    services,
};
use crate::{
    error::ApiError,
    extract::{Id, JsonObject, Session},
    state::AppState,
};

pub fn advertisement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/advertisement",
            get(list_advertisements).post(create_advertisement),
        )
        .route(
            "/advertisement/:id",
            get(get_advertisement)
                .patch(update_advertisement)
                .delete(delete_advertisement),
        )
}

#[instrument(skip(session))]
pub async fn list_advertisements(
    mut session: Session,
) -> Result<Json<Vec<AdvertisementView>>, ApiError> {
    let ads = services::list_advertisements(session.begin().await?).await?;
    Ok(Json(ads.into_iter().map(AdvertisementView::from).collect()))
}

#[instrument(skip(session))]
pub async fn get_advertisement(
    mut session: Session,
    Id(id): Id,
) -> Result<Json<AdvertisementView>, ApiError> {
    let ad = services::get_advertisement(session.begin().await?, id).await?;
    Ok(Json(ad.into()))
}

#[instrument(skip(session, body))]
pub async fn create_advertisement(
    mut session: Session,
    JsonObject(body): JsonObject,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<AdvertisementView>), ApiError> {
    let fields = CREATE_ADVERTISEMENT
        .validate(&body)
        .map_err(ApiError::Validation)?;
    let uow = session.begin().await?;
    let ad = services::create_advertisement(uow, CreateAdvertisement::from_fields(&fields)).await?;
    let location = format!("/api/v1/advertisement/{}", ad.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(ad.into()),
    ))
}

#[instrument(skip(session, body))]
pub async fn update_advertisement(
    mut session: Session,
    Id(id): Id,
    JsonObject(body): JsonObject,
) -> Result<Json<AdvertisementView>, ApiError> {
    let fields = UPDATE_ADVERTISEMENT
        .validate(&body)
        .map_err(ApiError::Validation)?;
    let uow = session.begin().await?;
    let ad = services::update_advertisement(uow, id, UpdateAdvertisement::from_fields(&fields)).await?;
    Ok(Json(ad.into()))
}

#[instrument(skip(session))]
pub async fn delete_advertisement(
    mut session: Session,
    Id(id): Id,
) -> Result<StatusCode, ApiError> {
    services::delete_advertisement(session.begin().await?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use serde_json::json;

    use crate::app::test_support::TestApp;

    async fn app_with_owner() -> TestApp {
        let app = TestApp::new();
        app.create_user("owner", "testtest").await;
        app
    }

    #[tokio::test]
    async fn create_and_fetch_advertisement() {
        let app = app_with_owner().await;
        let (status, body, headers) = app
            .send(
                "POST",
                "/api/v1/advertisement",
                Some(json!({"title": "bike", "description": "red", "owner_id": 1})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(headers[header::LOCATION], "/api/v1/advertisement/1");
        assert_eq!(body["id"], 1);
        assert_eq!(body["title"], "bike");
        assert_eq!(body["description"], "red");
        assert_eq!(body["owner_id"], 1);
        assert!(body["add_time"].is_string());

        let (status, fetched, _) = app.send("GET", "/api/v1/advertisement/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, body);
    }

    #[tokio::test]
    async fn description_is_optional() {
        let app = app_with_owner().await;
        let (status, body, _) = app
            .send("POST", "/api/v1/advertisement", Some(json!({"title": "bike", "owner_id": "1"})))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["description"].is_null());
        assert_eq!(body["owner_id"], 1);
    }

    #[tokio::test]
    async fn missing_title_and_owner_are_reported_together() {
        let app = app_with_owner().await;
        let (status, body, _) = app
            .send("POST", "/api/v1/advertisement", Some(json!({"description": "x"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"][0]["field"], "title");
        assert_eq!(body["message"][1]["field"], "owner_id");
    }

    #[tokio::test]
    async fn field_types_are_checked() {
        let app = app_with_owner().await;
        let (status, body, _) = app
            .send("POST", "/api/v1/advertisement", Some(json!({"title": 7, "owner_id": "one"})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_owner_is_404_and_nothing_is_inserted() {
        let app = app_with_owner().await;
        let (status, body, _) = app
            .send("POST", "/api/v1/advertisement", Some(json!({"title": "bike", "owner_id": 42})))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User with ID 42 not found");

        let (_, list, _) = app.send("GET", "/api/v1/advertisement", None).await;
        assert_eq!(list, json!([]));
    }

    #[tokio::test]
    async fn list_returns_every_advertisement() {
        let app = app_with_owner().await;
        for title in ["bike", "lamp"] {
            app.send("POST", "/api/v1/advertisement", Some(json!({"title": title, "owner_id": 1})))
                .await;
        }
        let (status, list, _) = app.send("GET", "/api/v1/advertisement", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 2);
        assert_eq!(list[1]["title"], "lamp");
    }

    #[tokio::test]
    async fn patch_ignores_unknown_and_immutable_keys() {
        let app = app_with_owner().await;
        app.send(
            "POST",
            "/api/v1/advertisement",
            Some(json!({"title": "bike", "description": "red", "owner_id": 1})),
        )
        .await;

        let (status, body, _) = app
            .send(
                "PATCH",
                "/api/v1/advertisement/1",
                Some(json!({"title": "blue bike", "id": 50, "colour": "blue"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 1);
        assert_eq!(body["title"], "blue bike");
        assert_eq!(body["description"], "red");
    }

    #[tokio::test]
    async fn patch_to_unknown_owner_is_404_and_unchanged() {
        let app = app_with_owner().await;
        app.send("POST", "/api/v1/advertisement", Some(json!({"title": "bike", "owner_id": 1})))
            .await;

        let (status, _, _) = app
            .send(
                "PATCH",
                "/api/v1/advertisement/1",
                Some(json!({"title": "moved", "owner_id": 9})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body, _) = app.send("GET", "/api/v1/advertisement/1", None).await;
        assert_eq!(body["title"], "bike");
        assert_eq!(body["owner_id"], 1);
    }

    #[tokio::test]
    async fn missing_advertisement_is_404_naming_the_id() {
        let app = app_with_owner().await;
        for method in ["GET", "DELETE"] {
            let (status, body, _) = app.send(method, "/api/v1/advertisement/5", None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["message"], "Advertisement 5 not found");
        }
        let (status, _, _) = app
            .send("PATCH", "/api/v1/advertisement/5", Some(json!({"title": "x"})))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_advertisement_then_user_cascade() {
        let app = app_with_owner().await;
        for title in ["bike", "lamp"] {
            app.send("POST", "/api/v1/advertisement", Some(json!({"title": title, "owner_id": 1})))
                .await;
        }

        let (status, _, _) = app.send("DELETE", "/api/v1/advertisement/1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _, _) = app.send("GET", "/api/v1/advertisement/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, _) = app.send("DELETE", "/api/v1/user/1", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, list, _) = app.send("GET", "/api/v1/advertisement", None).await;
        assert_eq!(list, json!([]));
    }
}
