use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::i18n::Locale;

/// A user account. Accounts reach organizations only through affiliations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    #[serde(rename = "_id")]
    pub id: String,
    /// Login e-mail address
    pub user_name: String,
    pub display_name: String,
    pub preferred_lang: Locale,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(user_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_name: user_name.into(),
            display_name: display_name.into(),
            preferred_lang: Locale::En,
            created_at: Utc::now(),
        }
    }
}
