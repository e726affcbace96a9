//! The registered cascade mutations.
//!
//! Each mutation decodes its own target, authorizes the actor and resolves its
//! dependency closure. Planning, execution and reporting are shared.

mod archive_organization;
mod close_account;
mod registry;
mod remove_domain;

pub use archive_organization::ArchiveOrganization;
pub use close_account::CloseAccount;
pub use registry::OperationRegistry;
pub use remove_domain::RemoveDomain;

use async_trait::async_trait;

use crate::cascade::gate::Actor;
use crate::cascade::global_id::{GlobalIdError, TargetIds};
use crate::cascade::kind::CascadeKind;
use crate::cascade::outcome::{Rejection, Stop};
use crate::cascade::resolver::DependencyClosure;
use crate::cascade::store::CascadeStore;
use crate::dtos::MutationInput;
use crate::i18n::Message;

/// Output of a successful authorize-and-resolve phase.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub closure: DependencyClosure,
    /// Caller-facing status on commit
    pub success: Message,
    /// Audit line on commit
    pub success_reason: String,
}

#[async_trait]
pub trait CascadeMutation: Send + Sync {
    fn kind(&self) -> CascadeKind;

    fn decode(&self, input: &MutationInput) -> Result<TargetIds, Rejection>;

    /// Authorize the actor and gather everything the cascade will delete.
    ///
    /// Performs reads only.
    async fn prepare(
        &self,
        store: &dyn CascadeStore,
        actor: &Actor,
        target: &TargetIds,
    ) -> Result<Prepared, Stop>;
}

fn invalid_target(kind: CascadeKind, err: GlobalIdError) -> Rejection {
    Rejection::bad_request(
        Message::InvalidTarget,
        format!("Unable to decode {} target: {}", kind, err),
    )
}
