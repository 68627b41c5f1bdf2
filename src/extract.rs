use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde_json::Value;
use std::sync::Arc;

use crate::{error::ApiError, state::AppState, store::{Store, UnitOfWork}, validation::Fields};

/// The request's unit of work, begun lazily on first use.
///
/// Handlers read and validate the body before calling [`Session::begin`], so
/// no transaction or store lock is held while a client is still uploading.
/// Dropping the session without `commit` rolls back, on every exit path.
pub struct Session {
    store: Arc<dyn Store>,
    uow: Option<Box<dyn UnitOfWork>>,
}

impl Session {
    pub async fn begin(&mut self) -> Result<&mut dyn UnitOfWork, ApiError> {
        let uow = match self.uow.take() {
            Some(uow) => uow,
            None => self.store.begin().await?,
        };
        Ok(self.uow.insert(uow).as_mut())
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Session {
            store: state.store.clone(),
            uow: None,
        })
    }
}

/// JSON request body that must be an object. Anything else is a 400.
pub struct JsonObject(pub Fields);

#[async_trait]
impl<S> FromRequest<S> for JsonObject
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<Value>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| ApiError::invalid("body", e.body_text()))?;
        match value {
            Value::Object(fields) => Ok(JsonObject(fields)),
            _ => Err(ApiError::invalid("body", "Input should be a JSON object")),
        }
    }
}

/// Integer resource id from the path.
pub struct Id(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for Id
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::invalid("id", "Input should be a valid integer"))?;
        Ok(Id(id))
    }
}
