//! Turns a dependency closure into the ordered list of deletes.
//!
//! Children are always deleted before parents. A domain is deleted together
//! with its artifacts only when the acting organization is its last claimant;
//! otherwise only the claim edge goes.

use std::collections::{HashMap, HashSet};

use super::resolver::{DependencyClosure, DomainClosure, OrganizationClosure};
use super::store::WriteOp;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadePlan {
    steps: Vec<WriteOp>,
}

impl CascadePlan {
    pub fn steps(&self) -> &[WriteOp] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Claims already scheduled for removal, per domain.
///
/// When one cascade deletes several organizations that share a domain, the
/// last of them to be planned sees itself as the sole remaining claimant.
#[derive(Default)]
struct ClaimLedger {
    removed: HashMap<String, u64>,
}

impl ClaimLedger {
    fn remaining(&self, domain: &DomainClosure) -> u64 {
        let removed = self.removed.get(&domain.domain.id).copied().unwrap_or(0);
        domain.claim_count.saturating_sub(removed)
    }

    fn record(&mut self, domain_id: &str) {
        *self.removed.entry(domain_id.to_string()).or_insert(0) += 1;
    }
}

pub fn plan(closure: &DependencyClosure) -> CascadePlan {
    let mut steps = Vec::new();
    let mut ledger = ClaimLedger::default();
    let mut deleted_orgs = HashSet::new();

    for org in &closure.organizations {
        plan_organization(&mut steps, &mut ledger, org);
        deleted_orgs.insert(org.organization.id.as_str());
    }

    if let Some(detached) = &closure.detached_claim {
        let sole = plan_domain(&mut steps, &mut ledger, &detached.org_id, &detached.domain);
        if !sole {
            steps.push(WriteOp::DeleteOrgDomainOwnership {
                org_id: detached.org_id.clone(),
                domain_id: detached.domain.domain.id.clone(),
            });
        }
    }

    if let Some(account) = &closure.account {
        let remaining = account
            .affiliations
            .iter()
            .any(|a| !deleted_orgs.contains(a.org_id.as_str()));
        if remaining {
            steps.push(WriteOp::DeleteAccountAffiliations {
                account_id: account.account.id.clone(),
            });
        }
        steps.push(WriteOp::DeleteAccount {
            account_id: account.account.id.clone(),
        });
    }

    CascadePlan { steps }
}

/// Returns whether the domain itself was scheduled for deletion.
fn plan_domain(
    steps: &mut Vec<WriteOp>,
    ledger: &mut ClaimLedger,
    org_id: &str,
    domain: &DomainClosure,
) -> bool {
    let domain_id = domain.domain.id.clone();
    let sole = ledger.remaining(domain) <= 1;
    ledger.record(&domain_id);

    if sole {
        steps.push(WriteOp::DeleteDmarcSummaries {
            domain_id: domain_id.clone(),
        });
        steps.push(WriteOp::DeleteDomainOwnerships {
            domain_id: domain_id.clone(),
        });
        steps.push(WriteOp::DeleteWebScans {
            domain_id: domain_id.clone(),
        });
        steps.push(WriteOp::DeleteDnsScans {
            domain_id: domain_id.clone(),
        });
        steps.push(WriteOp::DeleteDomain {
            domain_id: domain_id.clone(),
        });
    }

    steps.push(WriteOp::DeleteClaim {
        org_id: org_id.to_string(),
        domain_id,
    });

    sole
}

fn plan_organization(steps: &mut Vec<WriteOp>, ledger: &mut ClaimLedger, org: &OrganizationClosure) {
    let org_id = &org.organization.id;

    let mut deleted_domains = HashSet::new();
    for domain in &org.domains {
        if plan_domain(steps, ledger, org_id, domain) {
            deleted_domains.insert(domain.domain.id.as_str());
        }
    }

    if org.stale_claims > 0 {
        steps.push(WriteOp::DeleteOrgClaims {
            org_id: org_id.clone(),
        });
    }

    if org
        .ownerships
        .iter()
        .any(|o| !deleted_domains.contains(o.domain_id.as_str()))
    {
        steps.push(WriteOp::DeleteOrgOwnerships {
            org_id: org_id.clone(),
        });
    }

    if org.affiliation_count > 0 {
        steps.push(WriteOp::DeleteOrgAffiliations {
            org_id: org_id.clone(),
        });
    }

    steps.push(WriteOp::DeleteOrganization {
        org_id: org_id.clone(),
    });
}
