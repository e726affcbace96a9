use async_trait::async_trait;

use super::{invalid_target, CascadeMutation, Prepared};
use crate::cascade::gate::{authorize, Actor, Decision, Target};
use crate::cascade::global_id::{TargetIds, USER};
use crate::cascade::kind::CascadeKind;
use crate::cascade::outcome::{Rejection, Stop};
use crate::cascade::resolver;
use crate::cascade::store::CascadeStore;
use crate::dtos::MutationInput;
use crate::i18n::Message;

/// Deletes an account, every organization it owns, and all of its affiliations.
pub struct CloseAccount;

#[async_trait]
impl CascadeMutation for CloseAccount {
    fn kind(&self) -> CascadeKind {
        CascadeKind::CloseAccount
    }

    fn decode(&self, input: &MutationInput) -> Result<TargetIds, Rejection> {
        TargetIds::decode(input, USER, false).map_err(|e| invalid_target(self.kind(), e))
    }

    async fn prepare(
        &self,
        store: &dyn CascadeStore,
        actor: &Actor,
        target: &TargetIds,
    ) -> Result<Prepared, Stop> {
        let account_id = target.key.as_str();

        if let Decision::Denied(_) = authorize(actor, Target::Account { account_id }) {
            return Err(Rejection::forbidden(
                Message::CloseAccountForbidden,
                format!(
                    "User: {} attempted to close user: {} account, but requesting user is not a super admin.",
                    actor.id, account_id
                ),
            )
            .into());
        }

        let Some(account) = store.find_account(account_id).await? else {
            return Err(Rejection::bad_request(
                Message::CloseAccountUnknownUser,
                format!(
                    "User: {} attempted to close user: {} account, but no account is associated with that id.",
                    actor.id, account_id
                ),
            )
            .into());
        };

        let closure = resolver::resolve_close_account(store, account).await?;

        Ok(Prepared {
            closure,
            success: Message::AccountClosed,
            success_reason: format!(
                "User: {} successfully closed user: {} account.",
                actor.id, account_id
            ),
        })
    }
}
