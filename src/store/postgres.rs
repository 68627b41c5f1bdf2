use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgConnection, PgPool, Postgres, Transaction};
use tracing::{debug, info};

use super::{Store, StoreError, UnitOfWork};
use crate::adverts::repo_types::{Advertisement, NewAdvertisement};
use crate::users::repo_types::{NewUser, User};

const SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS app_user (
        id                BIGSERIAL PRIMARY KEY,
        username          TEXT NOT NULL UNIQUE,
        password          TEXT NOT NULL,
        registration_time TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS app_advertisement (
        id          BIGSERIAL PRIMARY KEY,
        title       TEXT NOT NULL,
        description TEXT,
        add_time    TIMESTAMPTZ NOT NULL DEFAULT now(),
        owner_id    BIGINT NOT NULL REFERENCES app_user (id) ON DELETE CASCADE
    )
    "#,
];

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    /// Creates the tables if they are missing. Existing tables are left alone.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("bootstrap schema")?;
        }
        info!("database schema ready");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx: Some(tx) }))
    }
}

/// One transaction; rolled back by sqlx when dropped uncommitted.
pub struct PgUnitOfWork {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgUnitOfWork {
    fn conn(&mut self) -> Result<&mut PgConnection, StoreError> {
        match self.tx.as_mut() {
            Some(tx) => Ok(&mut **tx),
            None => Err(StoreError::Closed),
        }
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn find_user(&mut self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, registration_time
            FROM app_user
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.conn()?)
        .await?;
        Ok(user)
    }

    async fn insert_user(&mut self, user: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO app_user (username, password)
            VALUES ($1, $2)
            RETURNING id, username, password, registration_time
            "#,
        )
        .bind(user.username)
        .bind(user.password_hash)
        .fetch_one(self.conn()?)
        .await?;
        Ok(user)
    }

    async fn save_user(&mut self, user: &User) -> Result<(), StoreError> {
        sqlx::query(r#"UPDATE app_user SET username = $1, password = $2 WHERE id = $3"#)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.id)
            .execute(self.conn()?)
            .await?;
        Ok(())
    }

    async fn delete_user(&mut self, id: i64) -> Result<(), StoreError> {
        sqlx::query(r#"DELETE FROM app_user WHERE id = $1"#)
            .bind(id)
            .execute(self.conn()?)
            .await?;
        Ok(())
    }

    async fn find_advertisement(&mut self, id: i64) -> Result<Option<Advertisement>, StoreError> {
        let ad = sqlx::query_as::<_, Advertisement>(
            r#"
            SELECT id, title, description, add_time, owner_id
            FROM app_advertisement
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.conn()?)
        .await?;
        Ok(ad)
    }

    async fn list_advertisements(&mut self) -> Result<Vec<Advertisement>, StoreError> {
        let rows = sqlx::query_as::<_, Advertisement>(
            r#"
            SELECT id, title, description, add_time, owner_id
            FROM app_advertisement
            ORDER BY id
            "#,
        )
        .fetch_all(self.conn()?)
        .await?;
        Ok(rows)
    }

    async fn list_advertisements_by_owner(
        &mut self,
        owner_id: i64,
    ) -> Result<Vec<Advertisement>, StoreError> {
        let rows = sqlx::query_as::<_, Advertisement>(
            r#"
            SELECT id, title, description, add_time, owner_id
            FROM app_advertisement
            WHERE owner_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.conn()?)
        .await?;
        Ok(rows)
    }

    async fn insert_advertisement(
        &mut self,
        ad: NewAdvertisement,
    ) -> Result<Advertisement, StoreError> {
        let ad = sqlx::query_as::<_, Advertisement>(
            r#"
            INSERT INTO app_advertisement (title, description, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, description, add_time, owner_id
            "#,
        )
        .bind(ad.title)
        .bind(ad.description)
        .bind(ad.owner_id)
        .fetch_one(self.conn()?)
        .await?;
        Ok(ad)
    }

    async fn save_advertisement(&mut self, ad: &Advertisement) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE app_advertisement
            SET title = $1, description = $2, owner_id = $3
            WHERE id = $4
            "#,
        )
        .bind(&ad.title)
        .bind(&ad.description)
        .bind(ad.owner_id)
        .bind(ad.id)
        .execute(self.conn()?)
        .await?;
        Ok(())
    }

    async fn delete_advertisement(&mut self, id: i64) -> Result<(), StoreError> {
        sqlx::query(r#"DELETE FROM app_advertisement WHERE id = $1"#)
            .bind(id)
            .execute(self.conn()?)
            .await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        let tx = self.tx.take().ok_or(StoreError::Closed)?;
        tx.commit().await?;
        debug!("transaction committed");
        Ok(())
    }
}
