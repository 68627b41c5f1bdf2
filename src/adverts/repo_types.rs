use sqlx::FromRow;
use time::OffsetDateTime;

/// Advertisement row in `app_advertisement`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Advertisement {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub add_time: OffsetDateTime,
    pub owner_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewAdvertisement {
    pub title: String,
    pub description: Option<String>,
    pub owner_id: i64,
}
