//! Entity store: the unit-of-work seam between the mediator and the database.
//!
//! Every request opens exactly one [`UnitOfWork`] through [`Store::begin`].
//! Writes become visible only after [`UnitOfWork::commit`]; dropping a unit
//! of work without committing discards everything it did.

use async_trait::async_trait;

use crate::adverts::repo_types::{Advertisement, NewAdvertisement};
use crate::users::repo_types::{NewUser, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),
    #[error("unit of work already committed")]
    Closed,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let constraint = db.constraint().unwrap_or_default().to_string();
            if db.is_unique_violation() {
                return StoreError::UniqueViolation(constraint);
            }
            if db.is_foreign_key_violation() {
                return StoreError::ForeignKeyViolation(constraint);
            }
        }
        StoreError::Database(err)
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError>;
}

#[async_trait]
pub trait UnitOfWork: Send {
    async fn find_user(&mut self, id: i64) -> Result<Option<User>, StoreError>;
    async fn insert_user(&mut self, user: NewUser) -> Result<User, StoreError>;
    /// Writes every mutable column of `user` back to its row.
    async fn save_user(&mut self, user: &User) -> Result<(), StoreError>;
    async fn delete_user(&mut self, id: i64) -> Result<(), StoreError>;

    async fn find_advertisement(&mut self, id: i64) -> Result<Option<Advertisement>, StoreError>;
    async fn list_advertisements(&mut self) -> Result<Vec<Advertisement>, StoreError>;
    async fn list_advertisements_by_owner(
        &mut self,
        owner_id: i64,
    ) -> Result<Vec<Advertisement>, StoreError>;
    async fn insert_advertisement(
        &mut self,
        ad: NewAdvertisement,
    ) -> Result<Advertisement, StoreError>;
    async fn save_advertisement(&mut self, ad: &Advertisement) -> Result<(), StoreError>;
    async fn delete_advertisement(&mut self, id: i64) -> Result<(), StoreError>;

    /// Makes the unit of work durable. Any call after this returns [`StoreError::Closed`].
    async fn commit(&mut self) -> Result<(), StoreError>;
}
