//! User mutations, each run against the caller's unit of work.

use tracing::{info, warn};

use super::dto::{CreateUser, UpdateUser};
use super::password::hash_password;
use super::repo_types::{NewUser, User};
use crate::adverts::repo_types::Advertisement;
use crate::error::ApiError;
use crate::store::{StoreError, UnitOfWork};

fn conflict(err: StoreError) -> ApiError {
    match err {
        StoreError::UniqueViolation(constraint) => {
            warn!(%constraint, "username already taken");
            ApiError::Conflict("User already exists".into())
        }
        other => other.into(),
    }
}

pub async fn get_user(uow: &mut dyn UnitOfWork, id: i64) -> Result<User, ApiError> {
    uow.find_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User {id} not found")))
}

pub async fn create_user(uow: &mut dyn UnitOfWork, input: CreateUser) -> Result<User, ApiError> {
    let password_hash = hash_password(&input.password)?;
    let user = uow
        .insert_user(NewUser {
            username: input.username,
            password_hash,
        })
        .await
        .map_err(conflict)?;
    uow.commit().await.map_err(conflict)?;
    info!(user_id = user.id, username = %user.username, "user created");
    Ok(user)
}

pub async fn update_user(
    uow: &mut dyn UnitOfWork,
    id: i64,
    changes: UpdateUser,
) -> Result<User, ApiError> {
    let mut user = get_user(uow, id).await?;
    if let Some(username) = changes.username {
        user.username = username;
    }
    if let Some(password) = changes.password {
        user.password_hash = hash_password(&password)?;
    }
    uow.save_user(&user).await.map_err(conflict)?;
    uow.commit().await.map_err(conflict)?;
    info!(user_id = user.id, "user updated");
    Ok(user)
}

pub async fn delete_user(uow: &mut dyn UnitOfWork, id: i64) -> Result<(), ApiError> {
    let user = get_user(uow, id).await?;
    uow.delete_user(user.id).await?;
    uow.commit().await?;
    info!(user_id = id, "user deleted");
    Ok(())
}

pub async fn list_user_advertisements(
    uow: &mut dyn UnitOfWork,
    id: i64,
) -> Result<Vec<Advertisement>, ApiError> {
    let user = get_user(uow, id).await?;
    Ok(uow.list_advertisements_by_owner(user.id).await?)
}
