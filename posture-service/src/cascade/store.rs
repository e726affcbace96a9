use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Account, Affiliation, Claim, Domain, Organization, Ownership};

/// Failure of a store call. Both variants are operator-facing only.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A query or write could not be executed.
    #[error("database error: {0}")]
    Database(anyhow::Error),

    /// A query succeeded but iterating its result set failed.
    #[error("cursor error: {0}")]
    Cursor(anyhow::Error),
}

impl StoreError {
    pub fn database(err: impl Into<anyhow::Error>) -> Self {
        StoreError::Database(err.into())
    }

    pub fn cursor(err: impl Into<anyhow::Error>) -> Self {
        StoreError::Cursor(err.into())
    }
}

/// Number of scan artifacts hanging off one domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtifactCounts {
    pub web_scans: u64,
    pub dns_scans: u64,
    pub dmarc_summaries: u64,
}

/// One delete issued inside a cascade transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    DeleteDmarcSummaries { domain_id: String },
    DeleteDomainOwnerships { domain_id: String },
    DeleteWebScans { domain_id: String },
    DeleteDnsScans { domain_id: String },
    DeleteDomain { domain_id: String },
    DeleteClaim { org_id: String, domain_id: String },
    DeleteOrgDomainOwnership { org_id: String, domain_id: String },
    DeleteOrgClaims { org_id: String },
    DeleteOrgOwnerships { org_id: String },
    DeleteOrgAffiliations { org_id: String },
    DeleteOrganization { org_id: String },
    DeleteAccountAffiliations { account_id: String },
    DeleteAccount { account_id: String },
}

impl WriteOp {
    /// Stable, low-cardinality name used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            WriteOp::DeleteDmarcSummaries { .. } => "dmarc_summaries",
            WriteOp::DeleteDomainOwnerships { .. } => "domain_ownerships",
            WriteOp::DeleteWebScans { .. } => "web_scans",
            WriteOp::DeleteDnsScans { .. } => "dns_scans",
            WriteOp::DeleteDomain { .. } => "domain",
            WriteOp::DeleteClaim { .. } => "claim",
            WriteOp::DeleteOrgDomainOwnership { .. } => "org_domain_ownership",
            WriteOp::DeleteOrgClaims { .. } => "org_claims",
            WriteOp::DeleteOrgOwnerships { .. } => "org_ownerships",
            WriteOp::DeleteOrgAffiliations { .. } => "org_affiliations",
            WriteOp::DeleteOrganization { .. } => "organization",
            WriteOp::DeleteAccountAffiliations { .. } => "account_affiliations",
            WriteOp::DeleteAccount { .. } => "account",
        }
    }
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOp::DeleteDmarcSummaries { domain_id } => {
                write!(f, "remove dmarc summaries for domain: {}", domain_id)
            }
            WriteOp::DeleteDomainOwnerships { domain_id } => {
                write!(f, "remove ownerships for domain: {}", domain_id)
            }
            WriteOp::DeleteWebScans { domain_id } => {
                write!(f, "remove web scans for domain: {}", domain_id)
            }
            WriteOp::DeleteDnsScans { domain_id } => {
                write!(f, "remove dns scans for domain: {}", domain_id)
            }
            WriteOp::DeleteDomain { domain_id } => write!(f, "remove domain: {}", domain_id),
            WriteOp::DeleteClaim { org_id, domain_id } => {
                write!(f, "remove claim of domain: {} by org: {}", domain_id, org_id)
            }
            WriteOp::DeleteOrgDomainOwnership { org_id, domain_id } => {
                write!(f, "remove ownership of domain: {} by org: {}", domain_id, org_id)
            }
            WriteOp::DeleteOrgClaims { org_id } => {
                write!(f, "remove remaining claims for org: {}", org_id)
            }
            WriteOp::DeleteOrgOwnerships { org_id } => {
                write!(f, "remove remaining ownerships for org: {}", org_id)
            }
            WriteOp::DeleteOrgAffiliations { org_id } => {
                write!(f, "remove affiliations for org: {}", org_id)
            }
            WriteOp::DeleteOrganization { org_id } => write!(f, "remove org: {}", org_id),
            WriteOp::DeleteAccountAffiliations { account_id } => {
                write!(f, "remove affiliations for user: {}", account_id)
            }
            WriteOp::DeleteAccount { account_id } => write!(f, "remove user: {}", account_id),
        }
    }
}

/// Read access plus transaction creation for the cascade pipeline.
///
/// Reads are issued outside the transaction; only the planned deletes run
/// inside it.
#[async_trait]
pub trait CascadeStore: Send + Sync {
    async fn find_account(&self, account_id: &str) -> Result<Option<Account>, StoreError>;

    async fn find_organization(&self, org_id: &str) -> Result<Option<Organization>, StoreError>;

    async fn find_domain(&self, domain_id: &str) -> Result<Option<Domain>, StoreError>;

    async fn account_affiliations(&self, account_id: &str)
        -> Result<Vec<Affiliation>, StoreError>;

    async fn count_org_affiliations(&self, org_id: &str) -> Result<u64, StoreError>;

    /// Count `super_admin` affiliations, optionally restricted to one organization.
    async fn count_super_admin_affiliations(&self, org_id: Option<&str>)
        -> Result<u64, StoreError>;

    async fn org_claims(&self, org_id: &str) -> Result<Vec<Claim>, StoreError>;

    async fn count_claims(&self, domain_id: &str) -> Result<u64, StoreError>;

    async fn org_ownerships(&self, org_id: &str) -> Result<Vec<Ownership>, StoreError>;

    async fn artifact_counts(&self, domain_id: &str) -> Result<ArtifactCounts, StoreError>;

    async fn begin(&self) -> Result<Box<dyn CascadeTransaction>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// An open all-or-nothing transaction.
#[async_trait]
pub trait CascadeTransaction: Send {
    /// Apply one delete, returning the number of removed documents.
    async fn step(&mut self, op: &WriteOp) -> Result<u64, StoreError>;

    async fn commit(&mut self) -> Result<(), StoreError>;

    async fn abort(&mut self) -> Result<(), StoreError>;
}
