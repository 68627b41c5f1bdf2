use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{Store, StoreError, UnitOfWork};
use crate::adverts::repo_types::{Advertisement, NewAdvertisement};
use crate::users::repo_types::{NewUser, User};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    advertisements: BTreeMap<i64, Advertisement>,
    last_user_id: i64,
    last_advertisement_id: i64,
}

/// Process-local store with the same constraints as the PostgreSQL schema.
///
/// A unit of work holds the table lock from `begin` until it is dropped, so
/// transactions are fully serialized. Read-only units never copy the tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let guard = self.tables.clone().lock_owned().await;
        Ok(Box::new(MemoryUnitOfWork {
            tables: guard,
            backup: None,
            committed: false,
        }))
    }
}

pub struct MemoryUnitOfWork {
    tables: OwnedMutexGuard<Tables>,
    // taken on the first write, restored on drop unless committed
    backup: Option<Tables>,
    committed: bool,
}

impl MemoryUnitOfWork {
    fn read(&self) -> Result<&Tables, StoreError> {
        if self.committed {
            return Err(StoreError::Closed);
        }
        Ok(&*self.tables)
    }

    fn write(&mut self) -> Result<&mut Tables, StoreError> {
        if self.committed {
            return Err(StoreError::Closed);
        }
        if self.backup.is_none() {
            self.backup = Some((*self.tables).clone());
        }
        Ok(&mut *self.tables)
    }
}

impl Drop for MemoryUnitOfWork {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Some(backup) = self.backup.take() {
            *self.tables = backup;
        }
    }
}

impl Tables {
    fn check_username(&self, username: &str, except: Option<i64>) -> Result<(), StoreError> {
        let taken = self
            .users
            .values()
            .any(|u| u.username == username && Some(u.id) != except);
        if taken {
            return Err(StoreError::UniqueViolation("app_user_username_key".into()));
        }
        Ok(())
    }

    fn check_owner(&self, owner_id: i64) -> Result<(), StoreError> {
        if !self.users.contains_key(&owner_id) {
            return Err(StoreError::ForeignKeyViolation(
                "app_advertisement_owner_id_fkey".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn find_user(&mut self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn insert_user(&mut self, user: NewUser) -> Result<User, StoreError> {
        let tables = self.write()?;
        tables.check_username(&user.username, None)?;
        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: user.username,
            password_hash: user.password_hash,
            registration_time: OffsetDateTime::now_utc(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn save_user(&mut self, user: &User) -> Result<(), StoreError> {
        let tables = self.write()?;
        tables.check_username(&user.username, Some(user.id))?;
        if let Some(row) = tables.users.get_mut(&user.id) {
            row.username = user.username.clone();
            row.password_hash = user.password_hash.clone();
        }
        Ok(())
    }

    async fn delete_user(&mut self, id: i64) -> Result<(), StoreError> {
        let tables = self.write()?;
        tables.users.remove(&id);
        tables.advertisements.retain(|_, ad| ad.owner_id != id);
        Ok(())
    }

    async fn find_advertisement(&mut self, id: i64) -> Result<Option<Advertisement>, StoreError> {
        Ok(self.read()?.advertisements.get(&id).cloned())
    }

    async fn list_advertisements(&mut self) -> Result<Vec<Advertisement>, StoreError> {
        Ok(self.read()?.advertisements.values().cloned().collect())
    }

    async fn list_advertisements_by_owner(
        &mut self,
        owner_id: i64,
    ) -> Result<Vec<Advertisement>, StoreError> {
        Ok(self
            .read()?
            .advertisements
            .values()
            .filter(|ad| ad.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn insert_advertisement(
        &mut self,
        ad: NewAdvertisement,
    ) -> Result<Advertisement, StoreError> {
        let tables = self.write()?;
        tables.check_owner(ad.owner_id)?;
        tables.last_advertisement_id += 1;
        let ad = Advertisement {
            id: tables.last_advertisement_id,
            title: ad.title,
            description: ad.description,
            add_time: OffsetDateTime::now_utc(),
            owner_id: ad.owner_id,
        };
        tables.advertisements.insert(ad.id, ad.clone());
        Ok(ad)
    }

    async fn save_advertisement(&mut self, ad: &Advertisement) -> Result<(), StoreError> {
        let tables = self.write()?;
        tables.check_owner(ad.owner_id)?;
        if let Some(row) = tables.advertisements.get_mut(&ad.id) {
            row.title = ad.title.clone();
            row.description = ad.description.clone();
            row.owner_id = ad.owner_id;
        }
        Ok(())
    }

    async fn delete_advertisement(&mut self, id: i64) -> Result<(), StoreError> {
        self.write()?.advertisements.remove(&id);
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        if self.committed {
            return Err(StoreError::Closed);
        }
        self.committed = true;
        self.backup = None;
        Ok(())
    }
}
