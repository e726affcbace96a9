//! Dependency resolver: read-only discovery of everything a cascade touches.

use std::collections::HashSet;

use super::store::{ArtifactCounts, CascadeStore, StoreError};
use crate::models::{Account, Affiliation, Domain, Organization, Ownership, Role};

#[derive(Debug, Clone)]
pub struct DomainClosure {
    pub domain: Domain,
    /// Claims on the domain across all organizations, read before any delete
    pub claim_count: u64,
    pub artifacts: ArtifactCounts,
}

#[derive(Debug, Clone)]
pub struct OrganizationClosure {
    pub organization: Organization,
    pub affiliation_count: u64,
    pub ownerships: Vec<Ownership>,
    pub domains: Vec<DomainClosure>,
    /// Claims whose domain document no longer exists
    pub stale_claims: usize,
}

#[derive(Debug, Clone)]
pub struct AccountClosure {
    pub account: Account,
    pub affiliations: Vec<Affiliation>,
}

/// One organization's claim on one domain, removed without removing the organization.
#[derive(Debug, Clone)]
pub struct DetachedClaim {
    pub org_id: String,
    pub domain: DomainClosure,
}

/// How many `super_admin` affiliations exist, and how many a cascade would delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuperAdminTally {
    pub removed: u64,
    pub total: u64,
}

impl SuperAdminTally {
    pub fn removes_last(&self) -> bool {
        self.total > 0 && self.removed >= self.total
    }
}

/// Everything the planner needs, gathered before the transaction opens.
#[derive(Debug, Clone, Default)]
pub struct DependencyClosure {
    /// Organizations deleted in full, in cascade order
    pub organizations: Vec<OrganizationClosure>,
    pub detached_claim: Option<DetachedClaim>,
    pub account: Option<AccountClosure>,
    pub super_admins: SuperAdminTally,
}

pub async fn resolve_domain(
    store: &dyn CascadeStore,
    domain: Domain,
) -> Result<DomainClosure, StoreError> {
    let claim_count = store.count_claims(&domain.id).await?;
    let artifacts = store.artifact_counts(&domain.id).await?;
    Ok(DomainClosure {
        domain,
        claim_count,
        artifacts,
    })
}

pub async fn resolve_organization(
    store: &dyn CascadeStore,
    organization: Organization,
) -> Result<OrganizationClosure, StoreError> {
    let affiliation_count = store.count_org_affiliations(&organization.id).await?;
    let ownerships = store.org_ownerships(&organization.id).await?;
    let claims = store.org_claims(&organization.id).await?;

    let mut domains = Vec::with_capacity(claims.len());
    let mut stale_claims = 0;
    for claim in claims {
        match store.find_domain(&claim.domain_id).await? {
            Some(domain) => domains.push(resolve_domain(store, domain).await?),
            None => stale_claims += 1,
        }
    }

    Ok(OrganizationClosure {
        organization,
        affiliation_count,
        ownerships,
        domains,
        stale_claims,
    })
}

pub async fn resolve_archive(
    store: &dyn CascadeStore,
    organization: Organization,
) -> Result<DependencyClosure, StoreError> {
    let removed = store
        .count_super_admin_affiliations(Some(&organization.id))
        .await?;
    let total = store.count_super_admin_affiliations(None).await?;
    let organization = resolve_organization(store, organization).await?;

    Ok(DependencyClosure {
        organizations: vec![organization],
        detached_claim: None,
        account: None,
        super_admins: SuperAdminTally { removed, total },
    })
}

/// Closing an account also deletes every organization the account owns.
pub async fn resolve_close_account(
    store: &dyn CascadeStore,
    account: Account,
) -> Result<DependencyClosure, StoreError> {
    let affiliations = store.account_affiliations(&account.id).await?;

    let mut owned = HashSet::new();
    let mut organizations = Vec::new();
    let mut removed = 0;
    for affiliation in affiliations.iter().filter(|a| a.owner) {
        if !owned.insert(affiliation.org_id.clone()) {
            continue;
        }
        if let Some(org) = store.find_organization(&affiliation.org_id).await? {
            removed += store.count_super_admin_affiliations(Some(&org.id)).await?;
            organizations.push(resolve_organization(store, org).await?);
        }
    }

    removed += affiliations
        .iter()
        .filter(|a| a.role == Role::SuperAdmin && !owned.contains(&a.org_id))
        .count() as u64;
    let total = store.count_super_admin_affiliations(None).await?;

    Ok(DependencyClosure {
        organizations,
        detached_claim: None,
        account: Some(AccountClosure {
            account,
            affiliations,
        }),
        super_admins: SuperAdminTally { removed, total },
    })
}

pub async fn resolve_remove_domain(
    store: &dyn CascadeStore,
    organization: &Organization,
    domain: Domain,
) -> Result<DependencyClosure, StoreError> {
    let domain = resolve_domain(store, domain).await?;
    Ok(DependencyClosure {
        detached_claim: Some(DetachedClaim {
            org_id: organization.id.clone(),
            domain,
        }),
        ..DependencyClosure::default()
    })
}
