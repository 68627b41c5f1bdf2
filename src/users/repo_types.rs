use sqlx::FromRow;
use time::OffsetDateTime;

/// User row in `app_user`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[sqlx(rename = "password")]
    pub password_hash: String, // argon2 PHC string, never plaintext
    pub registration_time: OffsetDateTime,
}

/// Values for a user insert; id and registration time come from the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}
