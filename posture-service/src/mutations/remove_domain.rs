use async_trait::async_trait;

use super::{invalid_target, CascadeMutation, Prepared};
use crate::cascade::gate::{authorize, Actor, Decision, Denial, Target};
use crate::cascade::global_id::{TargetIds, DOMAIN};
use crate::cascade::kind::CascadeKind;
use crate::cascade::outcome::{Rejection, Stop};
use crate::cascade::resolver;
use crate::cascade::store::CascadeStore;
use crate::dtos::MutationInput;
use crate::i18n::Message;

/// Removes one organization's claim on a domain, deleting the domain when no
/// other organization claims it.
pub struct RemoveDomain;

#[async_trait]
impl CascadeMutation for RemoveDomain {
    fn kind(&self) -> CascadeKind {
        CascadeKind::RemoveDomain
    }

    fn decode(&self, input: &MutationInput) -> Result<TargetIds, Rejection> {
        TargetIds::decode(input, DOMAIN, true).map_err(|e| invalid_target(self.kind(), e))
    }

    async fn prepare(
        &self,
        store: &dyn CascadeStore,
        actor: &Actor,
        target: &TargetIds,
    ) -> Result<Prepared, Stop> {
        let domain_id = target.key.as_str();
        let org_id = target.organization.as_deref().unwrap_or_default();

        let Some(org) = store.find_organization(org_id).await? else {
            return Err(Rejection::bad_request(
                Message::RemoveDomainUnknownOrganization,
                format!(
                    "User: {} attempted to remove domain: {} in org: {}, however there is no organization associated with that id.",
                    actor.id, domain_id, org_id
                ),
            )
            .into());
        };

        let Some(domain) = store.find_domain(domain_id).await? else {
            return Err(Rejection::bad_request(
                Message::RemoveDomainUnknownDomain,
                format!(
                    "User: {} attempted to remove domain: {} in org: {}, however there is no domain associated with that id.",
                    actor.id, domain_id, org_id
                ),
            )
            .into());
        };

        match authorize(actor, Target::OrganizationDomain(&org)) {
            Decision::Allowed => {}
            Decision::Denied(Denial::VerifiedOrganization) => {
                return Err(Rejection::forbidden(
                    Message::RemoveDomainForbidden,
                    format!(
                        "User: {} attempted to remove domain: {} in org: {}, however the org is verified and the user is not a super admin.",
                        actor.id, domain_id, org_id
                    ),
                )
                .into());
            }
            Decision::Denied(_) => {
                return Err(Rejection::forbidden(
                    Message::RemoveDomainForbidden,
                    format!(
                        "User: {} attempted to remove domain: {} in org: {}, however they do not have permission in that org.",
                        actor.id, domain_id, org_id
                    ),
                )
                .into());
            }
        }

        let claimed = store
            .org_claims(&org.id)
            .await?
            .iter()
            .any(|claim| claim.domain_id == domain.id);
        if !claimed {
            return Err(Rejection::bad_request(
                Message::RemoveDomainNotClaimed,
                format!(
                    "User: {} attempted to remove domain: {} in org: {}, however the org does not claim that domain.",
                    actor.id, domain_id, org_id
                ),
            )
            .into());
        }

        let success = Message::DomainRemoved {
            domain: domain.domain.clone(),
            acronym: org.acronym.clone(),
        };
        let closure = resolver::resolve_remove_domain(store, &org, domain).await?;

        Ok(Prepared {
            closure,
            success,
            success_reason: format!(
                "User: {} successfully removed domain: {} from org: {}.",
                actor.id, domain_id, org_id
            ),
        })
    }
}
