use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Permission level an account holds within one organization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Requested affiliation not yet approved
    Pending,
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Pending => "pending",
            Role::User => "user",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }
}

/// Membership edge between an account and an organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Affiliation {
    #[serde(rename = "_id")]
    pub id: String,
    pub account_id: String,
    pub org_id: String,
    pub role: Role,
    /// Set on the account that stewards the organization.
    pub owner: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Affiliation {
    pub fn new(account_id: impl Into<String>, org_id: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            account_id: account_id.into(),
            org_id: org_id.into(),
            role,
            owner: false,
            created_at: Utc::now(),
        }
    }

    pub fn owner(mut self) -> Self {
        self.owner = true;
        self
    }
}
