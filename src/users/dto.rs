use serde::Serialize;
use time::OffsetDateTime;

use super::repo_types::User;
use crate::validation::{Check, Fields, FieldsExt, Rule, Schema};

pub static CREATE_USER: Schema = Schema {
    rules: &[
        Rule::required("username", Check::Text { min_len: 1 }),
        Rule::required("password", Check::Text { min_len: 8 }),
    ],
};

pub static UPDATE_USER: Schema = Schema {
    rules: &[
        Rule::optional("username", Check::Text { min_len: 1 }),
        Rule::optional("password", Check::Text { min_len: 8 }),
    ],
};

/// Validated body of `POST /user`. The password is still plaintext here.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
}

impl CreateUser {
    pub fn from_fields(fields: &Fields) -> Self {
        Self {
            username: fields.text("username").unwrap_or_default(),
            password: fields.text("password").unwrap_or_default(),
        }
    }
}

/// Validated body of `PATCH /user/:id`; `None` means leave the column alone.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl UpdateUser {
    pub fn from_fields(fields: &Fields) -> Self {
        Self {
            username: fields.text("username"),
            password: fields.text("password"),
        }
    }
}

/// What clients see of a user. Never carries the id or the password.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub username: String,
    #[serde(with = "time::serde::rfc3339")]
    pub registration_time: OffsetDateTime,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            registration_time: user.registration_time,
        }
    }
}
