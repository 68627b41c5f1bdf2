use tracing::{info, warn};

use super::dto::{CreateAdvertisement, UpdateAdvertisement};
use super::repo_types::{Advertisement, NewAdvertisement};
use crate::error::ApiError;
use crate::store::{StoreError, UnitOfWork};

fn owner_not_found(owner_id: i64) -> ApiError {
    ApiError::NotFound(format!("User with ID {owner_id} not found"))
}

async fn ensure_owner(uow: &mut dyn UnitOfWork, owner_id: i64) -> Result<(), ApiError> {
    if uow.find_user(owner_id).await?.is_none() {
        warn!(owner_id, "advertisement owner does not exist");
        return Err(owner_not_found(owner_id));
    }
    Ok(())
}

/// A foreign-key violation here means the owner vanished after `ensure_owner`.
fn map_owner(owner_id: i64) -> impl FnOnce(StoreError) -> ApiError {
    move |err| match err {
        StoreError::ForeignKeyViolation(_) => owner_not_found(owner_id),
        other => other.into(),
    }
}

pub async fn get_advertisement(
    uow: &mut dyn UnitOfWork,
    id: i64,
) -> Result<Advertisement, ApiError> {
    uow.find_advertisement(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Advertisement {id} not found")))
}

pub async fn list_advertisements(uow: &mut dyn UnitOfWork) -> Result<Vec<Advertisement>, ApiError> {
    Ok(uow.list_advertisements().await?)
}

pub async fn create_advertisement(
    uow: &mut dyn UnitOfWork,
    input: CreateAdvertisement,
) -> Result<Advertisement, ApiError> {
    let owner_id = input.owner_id;
    ensure_owner(uow, owner_id).await?;
    let ad = uow
        .insert_advertisement(NewAdvertisement {
            title: input.title,
            description: input.description,
            owner_id,
        })
        .await
        .map_err(map_owner(owner_id))?;
    uow.commit().await.map_err(map_owner(owner_id))?;
    info!(advertisement_id = ad.id, owner_id, "advertisement created");
    Ok(ad)
}

pub async fn update_advertisement(
    uow: &mut dyn UnitOfWork,
    id: i64,
    changes: UpdateAdvertisement,
) -> Result<Advertisement, ApiError> {
    let mut ad = get_advertisement(uow, id).await?;
    if let Some(owner_id) = changes.owner_id {
        ensure_owner(uow, owner_id).await?;
    }
    changes.apply(&mut ad);
    uow.save_advertisement(&ad)
        .await
        .map_err(map_owner(ad.owner_id))?;
    uow.commit().await.map_err(map_owner(ad.owner_id))?;
    info!(advertisement_id = ad.id, "advertisement updated");
    Ok(ad)
}

pub async fn delete_advertisement(uow: &mut dyn UnitOfWork, id: i64) -> Result<(), ApiError> {
    let ad = get_advertisement(uow, id).await?;
    uow.delete_advertisement(ad.id).await?;
    uow.commit().await?;
    info!(advertisement_id = id, "advertisement deleted");
    Ok(())
}
