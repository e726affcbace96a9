use std::sync::Arc;

use serde::Deserialize;

use super::context::RequestContext;
use super::executor;
use super::gate::Actor;
use super::global_id::TargetIds;
use super::kind::{CascadeKind, UnknownOperation};
use super::outcome::{
    CascadeFault, Completed, Fault, FaultKind, MutationPayload, Rejection, Stop,
};
use super::planner;
use super::reporter::Reporter;
use super::store::{CascadeStore, StoreError};
use crate::dtos::MutationInput;
use crate::i18n::Message;
use crate::mutations::{CascadeMutation, OperationRegistry};
use crate::services::audit::AuditLogger;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
pub struct CascadeSettings {
    /// Reject cascades that would delete every `super_admin` affiliation.
    #[serde(default)]
    pub protect_last_super_admin: bool,
}

/// Entry point for every cascade mutation.
///
/// Shared read-only between requests; all per-request state travels in the
/// `RequestContext`.
pub struct CascadeEngine {
    store: Arc<dyn CascadeStore>,
    reporter: Reporter,
    registry: OperationRegistry,
    settings: CascadeSettings,
}

impl CascadeEngine {
    pub fn new(
        store: Arc<dyn CascadeStore>,
        logger: Arc<dyn AuditLogger>,
        settings: CascadeSettings,
    ) -> Self {
        Self::with_registry(store, logger, OperationRegistry::standard(), settings)
    }

    pub fn with_registry(
        store: Arc<dyn CascadeStore>,
        logger: Arc<dyn AuditLogger>,
        registry: OperationRegistry,
        settings: CascadeSettings,
    ) -> Self {
        Self {
            store,
            reporter: Reporter::new(logger),
            registry,
            settings,
        }
    }

    pub fn settings(&self) -> CascadeSettings {
        self.settings
    }

    pub fn operations(&self) -> Vec<CascadeKind> {
        self.registry.operations()
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        self.store.health_check().await
    }

    /// Resolve an operation name and execute it.
    pub async fn dispatch(
        &self,
        ctx: &RequestContext,
        operation: &str,
        input: &MutationInput,
    ) -> Result<Result<MutationPayload, CascadeFault>, UnknownOperation> {
        let kind: CascadeKind = operation.parse()?;
        Ok(self.execute(ctx, kind, input).await)
    }

    #[tracing::instrument(
        name = "cascade",
        skip(self, ctx, input),
        fields(operation = %kind, actor = %ctx.actor_id, request_id = %ctx.request_id)
    )]
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        kind: CascadeKind,
        input: &MutationInput,
    ) -> Result<MutationPayload, CascadeFault> {
        let Some(mutation) = self.registry.get(kind) else {
            let fault = Fault::new(
                FaultKind::Unregistered,
                None,
                format!("no handler registered for {}", kind),
            );
            return self
                .reporter
                .report(ctx, kind, &input.target, Err(fault.into()));
        };

        let target = match mutation.decode(input) {
            Ok(target) => target,
            Err(rejection) => {
                return self
                    .reporter
                    .report(ctx, kind, &input.target, Err(rejection.into()));
            }
        };

        let result = self.run(ctx, mutation.as_ref(), &target).await;
        self.reporter.report(ctx, kind, &target.key, result)
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        mutation: &dyn CascadeMutation,
        target: &TargetIds,
    ) -> Result<Completed, Stop> {
        let store = self.store.as_ref();
        let kind = mutation.kind();

        let actor = Actor::load(store, &ctx.actor_id).await?;
        let prepared = mutation.prepare(store, &actor, target).await?;

        if self.settings.protect_last_super_admin && prepared.closure.super_admins.removes_last() {
            return Err(Rejection::bad_request(
                Message::LastSuperAdmin,
                format!(
                    "User: {} attempted to {} on: {}, which would remove the last super admin affiliation.",
                    actor.id, kind, target.key
                ),
            )
            .into());
        }

        let plan = planner::plan(&prepared.closure);
        let report = executor::execute(store, kind, &plan).await?;

        Ok(Completed {
            message: prepared.success,
            reason: prepared.success_reason,
            steps: report.steps,
            deleted: report.deleted,
        })
    }
}
