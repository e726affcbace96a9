use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scanned domain. Domains exist as long as at least one organization claims them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Domain {
    #[serde(rename = "_id")]
    pub id: String,
    /// Host name, e.g. `canada.ca`
    pub domain: String,
    #[serde(default)]
    pub last_ran: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Domain {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            domain: domain.into(),
            last_ran: None,
            created_at: Utc::now(),
        }
    }
}

/// Organization -> Domain edge: the organization registers the domain for scanning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claim {
    #[serde(rename = "_id")]
    pub id: String,
    pub org_id: String,
    pub domain_id: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Claim {
    pub fn new(org_id: impl Into<String>, domain_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            org_id: org_id.into(),
            domain_id: domain_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// Organization -> Domain edge: the organization is the authoritative owner of
/// the domain's DMARC reporting data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ownership {
    #[serde(rename = "_id")]
    pub id: String,
    pub org_id: String,
    pub domain_id: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Ownership {
    pub fn new(org_id: impl Into<String>, domain_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            org_id: org_id.into(),
            domain_id: domain_id.into(),
            created_at: Utc::now(),
        }
    }
}
