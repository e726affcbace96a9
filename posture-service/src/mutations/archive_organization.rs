use async_trait::async_trait;

use super::{invalid_target, CascadeMutation, Prepared};
use crate::cascade::gate::{authorize, Actor, Decision, Denial, Target};
use crate::cascade::global_id::{TargetIds, ORGANIZATION};
use crate::cascade::kind::CascadeKind;
use crate::cascade::outcome::{Rejection, Stop};
use crate::cascade::resolver;
use crate::cascade::store::CascadeStore;
use crate::dtos::MutationInput;
use crate::i18n::Message;

/// Deletes an organization together with its claims, sole-claimed domains and edges.
pub struct ArchiveOrganization;

#[async_trait]
impl CascadeMutation for ArchiveOrganization {
    fn kind(&self) -> CascadeKind {
        CascadeKind::ArchiveOrganization
    }

    fn decode(&self, input: &MutationInput) -> Result<TargetIds, Rejection> {
        TargetIds::decode(input, ORGANIZATION, false).map_err(|e| invalid_target(self.kind(), e))
    }

    async fn prepare(
        &self,
        store: &dyn CascadeStore,
        actor: &Actor,
        target: &TargetIds,
    ) -> Result<Prepared, Stop> {
        let org_id = target.key.as_str();

        let Some(org) = store.find_organization(org_id).await? else {
            return Err(Rejection::bad_request(
                Message::ArchiveUnknownOrganization,
                format!(
                    "User: {} attempted to archive org: {}, but there is no org associated with that id.",
                    actor.id, org_id
                ),
            )
            .into());
        };

        match authorize(actor, Target::Organization(&org)) {
            Decision::Allowed => {}
            Decision::Denied(Denial::VerifiedOrganization) => {
                return Err(Rejection::forbidden(
                    Message::ArchiveForbidden,
                    format!(
                        "User: {} attempted to archive org: {}, however the org is verified and the user is not a super admin.",
                        actor.id, org_id
                    ),
                )
                .into());
            }
            Decision::Denied(_) => {
                return Err(Rejection::forbidden(
                    Message::ArchiveForbidden,
                    format!(
                        "User: {} attempted to archive org: {}, however they do not have permission to do so.",
                        actor.id, org_id
                    ),
                )
                .into());
            }
        }

        let success = Message::OrganizationArchived {
            acronym: org.acronym.clone(),
        };
        let closure = resolver::resolve_archive(store, org).await?;

        Ok(Prepared {
            closure,
            success,
            success_reason: format!(
                "User: {} successfully archived org: {}.",
                actor.id, org_id
            ),
        })
    }
}
