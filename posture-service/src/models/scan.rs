use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// HTTPS/TLS scan result for one domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebScan {
    #[serde(rename = "_id")]
    pub id: String,
    pub domain_id: String,
    pub https_status: String,
    pub hsts: bool,
    #[serde(default)]
    pub tls_protocols: Vec<String>,
    #[serde(default)]
    pub guidance_tags: Vec<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub scanned_at: DateTime<Utc>,
}

impl WebScan {
    pub fn new(domain_id: impl Into<String>, https_status: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            domain_id: domain_id.into(),
            https_status: https_status.into(),
            hsts: false,
            tls_protocols: Vec::new(),
            guidance_tags: Vec::new(),
            scanned_at: Utc::now(),
        }
    }
}

/// DNS (DMARC/SPF/DKIM) scan result for one domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DnsScan {
    #[serde(rename = "_id")]
    pub id: String,
    pub domain_id: String,
    pub dmarc_phase: String,
    pub spf_status: String,
    pub dkim_status: String,
    #[serde(default)]
    pub guidance_tags: Vec<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub scanned_at: DateTime<Utc>,
}

impl DnsScan {
    pub fn new(domain_id: impl Into<String>, dmarc_phase: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            domain_id: domain_id.into(),
            dmarc_phase: dmarc_phase.into(),
            spf_status: "info".to_string(),
            dkim_status: "info".to_string(),
            guidance_tags: Vec::new(),
            scanned_at: Utc::now(),
        }
    }
}

/// Aggregated DMARC report counts for one domain over one month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DmarcSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub domain_id: String,
    /// `YYYY-MM`
    pub period: String,
    pub pass_count: i64,
    pub fail_count: i64,
}

impl DmarcSummary {
    pub fn new(domain_id: impl Into<String>, period: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            domain_id: domain_id.into(),
            period: period.into(),
            pass_count: 0,
            fail_count: 0,
        }
    }
}
