use serde::Serialize;
use time::OffsetDateTime;

use super::repo_types::Advertisement;
use crate::validation::{Check, Fields, FieldsExt, Rule, Schema};

pub static CREATE_ADVERTISEMENT: Schema = Schema {
    rules: &[
        Rule::required("title", Check::Text { min_len: 1 }),
        Rule::required("owner_id", Check::Integer),
        Rule::optional("description", Check::NullableText),
    ],
};

/// `id`, `add_time` and unknown keys are not listed, so a patch drops them silently.
pub static UPDATE_ADVERTISEMENT: Schema = Schema {
    rules: &[
        Rule::optional("title", Check::Text { min_len: 1 }),
        Rule::optional("owner_id", Check::Integer),
        Rule::optional("description", Check::NullableText),
    ],
};

#[derive(Debug, Clone)]
pub struct CreateAdvertisement {
    pub title: String,
    pub description: Option<String>,
    pub owner_id: i64,
}

impl CreateAdvertisement {
    pub fn from_fields(fields: &Fields) -> Self {
        Self {
            title: fields.text("title").unwrap_or_default(),
            description: fields.nullable_text("description").flatten(),
            owner_id: fields.integer("owner_id").unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAdvertisement {
    pub title: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    pub owner_id: Option<i64>,
}

impl UpdateAdvertisement {
    pub fn from_fields(fields: &Fields) -> Self {
        Self {
            title: fields.text("title"),
            description: fields.nullable_text("description"),
            owner_id: fields.integer("owner_id"),
        }
    }

    pub fn apply(self, ad: &mut Advertisement) {
        if let Some(title) = self.title {
            ad.title = title;
        }
        if let Some(description) = self.description {
            ad.description = description;
        }
        if let Some(owner_id) = self.owner_id {
            ad.owner_id = owner_id;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdvertisementView {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub add_time: OffsetDateTime,
}

impl From<Advertisement> for AdvertisementView {
    fn from(ad: Advertisement) -> Self {
        Self {
            id: ad.id,
            title: ad.title,
            description: ad.description,
            owner_id: ad.owner_id,
            add_time: ad.add_time,
        }
    }
}
