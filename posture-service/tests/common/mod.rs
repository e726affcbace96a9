#![allow(dead_code)]

use std::sync::Arc;

use posture_service::cascade::{CascadeEngine, CascadeSettings, GlobalId, RequestContext};
use posture_service::dtos::MutationInput;
use posture_service::models::{
    Account, Affiliation, Claim, DmarcSummary, DnsScan, Domain, Organization, Ownership, Role,
    WebScan,
};
use posture_service::services::{MemoryAuditLogger, MemoryStore};

/// A small registry:
///
/// - `sa` is a super admin through `sa_org`
/// - `owner` owns `tbs` and `cra`; `member` is a plain user of `tbs`
/// - `tbs` claims `sole.gc.ca` alone and shares `shared.gc.ca` with `other`
/// - `cra` claims only `cra.gc.ca`
pub struct World {
    pub store: MemoryStore,
    pub logger: Arc<MemoryAuditLogger>,
    pub engine: CascadeEngine,

    pub sa: Account,
    pub owner: Account,
    pub member: Account,
    pub outsider: Account,

    pub sa_org: Organization,
    pub tbs: Organization,
    pub cra: Organization,
    pub other: Organization,

    pub sole: Domain,
    pub shared: Domain,
    pub cra_domain: Domain,
}

impl World {
    pub fn new() -> Self {
        Self::with_settings(CascadeSettings::default())
    }

    pub fn with_settings(settings: CascadeSettings) -> Self {
        let store = MemoryStore::new();
        let logger = Arc::new(MemoryAuditLogger::new());

        let sa = Account::new("sa@tbs-sct.gc.ca", "Super Admin");
        let owner = Account::new("owner@tbs-sct.gc.ca", "Owner");
        let member = Account::new("member@tbs-sct.gc.ca", "Member");
        let outsider = Account::new("outsider@example.com", "Outsider");

        let sa_org = Organization::new("SA", "Super Admin").verified();
        let tbs = Organization::new("TBS", "Treasury Board of Canada Secretariat");
        let cra = Organization::new("CRA", "Canada Revenue Agency");
        let other = Organization::new("PSPC", "Public Services and Procurement Canada");

        let sole = Domain::new("sole.gc.ca");
        let shared = Domain::new("shared.gc.ca");
        let cra_domain = Domain::new("cra.gc.ca");

        store.seed(|s| {
            for account in [&sa, &owner, &member, &outsider] {
                s.insert_account(account.clone());
            }
            for org in [&sa_org, &tbs, &cra, &other] {
                s.insert_organization(org.clone());
            }

            s.insert_affiliation(Affiliation::new(&sa.id, &sa_org.id, Role::SuperAdmin))
                .insert_affiliation(Affiliation::new(&owner.id, &tbs.id, Role::Admin).owner())
                .insert_affiliation(Affiliation::new(&owner.id, &cra.id, Role::Admin).owner())
                .insert_affiliation(Affiliation::new(&owner.id, &other.id, Role::User))
                .insert_affiliation(Affiliation::new(&member.id, &tbs.id, Role::User));

            for domain in [&sole, &shared, &cra_domain] {
                s.insert_domain(domain.clone())
                    .insert_web_scan(WebScan::new(&domain.id, "pass"))
                    .insert_dns_scan(DnsScan::new(&domain.id, "maintain"))
                    .insert_dmarc_summary(DmarcSummary::new(&domain.id, "2024-01"));
            }

            s.insert_claim(Claim::new(&tbs.id, &sole.id))
                .insert_claim(Claim::new(&tbs.id, &shared.id))
                .insert_claim(Claim::new(&other.id, &shared.id))
                .insert_claim(Claim::new(&cra.id, &cra_domain.id))
                .insert_ownership(Ownership::new(&tbs.id, &sole.id))
                .insert_ownership(Ownership::new(&other.id, &shared.id));
        });

        let engine = CascadeEngine::new(Arc::new(store.clone()), logger.clone(), settings);

        Self {
            store,
            logger,
            engine,
            sa,
            owner,
            member,
            outsider,
            sa_org,
            tbs,
            cra,
            other,
            sole,
            shared,
            cra_domain,
        }
    }
}

pub fn ctx(actor: &Account) -> RequestContext {
    RequestContext::new(&actor.id)
}

pub fn input(type_name: &str, key: &str) -> MutationInput {
    MutationInput {
        target: GlobalId::new(type_name, key).encode(),
        organization: None,
    }
}

pub fn edge_input(domain_id: &str, org_id: &str) -> MutationInput {
    MutationInput {
        target: GlobalId::new("domain", domain_id).encode(),
        organization: Some(GlobalId::new("organization", org_id).encode()),
    }
}
