use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An organization in the registry.
///
/// Verified organizations have been confirmed by a super admin and can only be
/// archived, or have domains removed, by one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    #[serde(rename = "_id")]
    pub id: String,
    pub acronym: String,
    pub name: String,
    pub verified: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(acronym: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            acronym: acronym.into(),
            name: name.into(),
            verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn verified(mut self) -> Self {
        self.verified = true;
        self
    }
}
