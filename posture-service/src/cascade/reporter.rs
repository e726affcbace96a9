//! Result reporter: maps a finished pipeline to the caller payload and emits
//! the single audit line for the invocation.

use std::sync::Arc;

use super::context::RequestContext;
use super::kind::CascadeKind;
use super::outcome::{
    CascadeFault, Completed, Fault, MutationPayload, Rejection, Stop, UserError,
};
use crate::services::audit::{AuditEntry, AuditLevel, AuditLogger, AuditOutcome};

#[derive(Clone)]
pub struct Reporter {
    logger: Arc<dyn AuditLogger>,
}

impl Reporter {
    pub fn new(logger: Arc<dyn AuditLogger>) -> Self {
        Self { logger }
    }

    pub fn report(
        &self,
        ctx: &RequestContext,
        kind: CascadeKind,
        target: &str,
        result: Result<Completed, Stop>,
    ) -> Result<MutationPayload, CascadeFault> {
        match result {
            Ok(completed) => Ok(self.success(ctx, kind, target, completed)),
            Err(Stop::Rejected(rejection)) => Ok(self.rejected(ctx, kind, target, rejection)),
            Err(Stop::Faulted(fault)) => Err(self.fault(ctx, kind, target, fault)),
        }
    }

    fn success(
        &self,
        ctx: &RequestContext,
        kind: CascadeKind,
        target: &str,
        completed: Completed,
    ) -> MutationPayload {
        self.emit(
            ctx,
            kind,
            AuditEntry::new(
                AuditLevel::Info,
                AuditOutcome::Success,
                kind.operation_name(),
                &ctx.actor_id,
                target,
                completed.reason,
            ),
        );

        tracing::debug!(
            operation = %kind,
            steps = completed.steps,
            deleted = completed.deleted,
            "Cascade committed"
        );

        MutationPayload::Result {
            status: completed.message.render(ctx.locale),
        }
    }

    fn rejected(
        &self,
        ctx: &RequestContext,
        kind: CascadeKind,
        target: &str,
        rejection: Rejection,
    ) -> MutationPayload {
        self.emit(
            ctx,
            kind,
            AuditEntry::new(
                AuditLevel::Warn,
                AuditOutcome::Rejected,
                kind.operation_name(),
                &ctx.actor_id,
                target,
                rejection.reason,
            ),
        );

        MutationPayload::Error(UserError {
            code: rejection.code.as_u16(),
            description: rejection.message.render(ctx.locale),
        })
    }

    fn fault(
        &self,
        ctx: &RequestContext,
        kind: CascadeKind,
        target: &str,
        fault: Fault,
    ) -> CascadeFault {
        let message = match &fault.step {
            Some(step) => format!(
                "{} error occurred for user: {} while attempting to {}: {}",
                fault.kind, ctx.actor_id, step, fault.cause
            ),
            None => format!(
                "{} error occurred for user: {} while attempting {} on: {}: {}",
                fault.kind, ctx.actor_id, kind, target, fault.cause
            ),
        };

        self.emit(
            ctx,
            kind,
            AuditEntry::new(
                AuditLevel::Error,
                AuditOutcome::Fault,
                kind.operation_name(),
                &ctx.actor_id,
                target,
                message,
            )
            .with_step(fault.step),
        );

        CascadeFault {
            kind,
            message: kind.failure_message().render(ctx.locale),
        }
    }

    fn emit(&self, ctx: &RequestContext, kind: CascadeKind, entry: AuditEntry) {
        metrics::counter!(
            "cascade_mutations_total",
            "operation" => kind.operation_name(),
            "outcome" => entry.outcome.to_string()
        )
        .increment(1);

        self.logger
            .log(&entry.with_request_id(ctx.request_id.clone()));
    }
}
