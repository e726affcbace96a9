//! Permission gate: decides whether the caller may run a cascade on a target.

use super::store::{CascadeStore, StoreError};
use crate::models::{Affiliation, Organization, Role};

/// The calling account together with every affiliation it holds.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: String,
    pub affiliations: Vec<Affiliation>,
}

impl Actor {
    pub async fn load(store: &dyn CascadeStore, actor_id: &str) -> Result<Self, StoreError> {
        let affiliations = store.account_affiliations(actor_id).await?;
        Ok(Self {
            id: actor_id.to_string(),
            affiliations,
        })
    }

    pub fn is_super_admin(&self) -> bool {
        self.affiliations
            .iter()
            .any(|a| a.role == Role::SuperAdmin)
    }

    pub fn affiliation_with(&self, org_id: &str) -> Option<&Affiliation> {
        self.affiliations.iter().find(|a| a.org_id == org_id)
    }
}

/// What the caller wants to act on.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// An account, which may not exist
    Account { account_id: &'a str },
    /// An organization as a whole
    Organization(&'a Organization),
    /// A domain claimed by an organization
    OrganizationDomain(&'a Organization),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    NotSuperAdmin,
    VerifiedOrganization,
    NotOrganizationOwner,
    NotOrganizationAdmin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(Denial),
}

pub fn authorize(actor: &Actor, target: Target<'_>) -> Decision {
    if actor.is_super_admin() {
        return Decision::Allowed;
    }

    match target {
        Target::Account { account_id } => {
            if actor.id == account_id {
                Decision::Allowed
            } else {
                Decision::Denied(Denial::NotSuperAdmin)
            }
        }
        Target::Organization(org) => {
            if org.verified {
                return Decision::Denied(Denial::VerifiedOrganization);
            }
            match actor.affiliation_with(&org.id) {
                Some(a) if a.owner => Decision::Allowed,
                _ => Decision::Denied(Denial::NotOrganizationOwner),
            }
        }
        Target::OrganizationDomain(org) => {
            if org.verified {
                return Decision::Denied(Denial::VerifiedOrganization);
            }
            match actor.affiliation_with(&org.id) {
                Some(a) if a.owner || a.role >= Role::Admin => Decision::Allowed,
                _ => Decision::Denied(Denial::NotOrganizationAdmin),
            }
        }
    }
}
