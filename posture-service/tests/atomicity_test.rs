//! A failure anywhere inside the transaction must leave the store untouched.

mod common;

use common::{ctx, input, World};
use posture_service::cascade::CascadeKind;
use posture_service::services::audit::{AuditLevel, AuditOutcome};

#[tokio::test]
async fn third_step_failure_commits_nothing() {
    let world = World::new();
    let before = world.store.snapshot();
    world.store.fail_step(2);

    let fault = world
        .engine
        .execute(
            &ctx(&world.owner),
            CascadeKind::ArchiveOrganization,
            &input("organization", &world.cra.id),
        )
        .await
        .unwrap_err();

    assert_eq!(
        fault.message,
        "Unable to archive organization. Please try again."
    );
    assert_eq!(world.store.snapshot(), before);
    assert_eq!(world.store.commits(), 0);

    let entries = world.logger.entries();
    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.level, AuditLevel::Error);
    assert_eq!(entry.outcome, AuditOutcome::Fault);
    let step = format!("remove web scans for domain: {}", world.cra_domain.id);
    assert_eq!(entry.step.as_deref(), Some(step.as_str()));
    assert_eq!(
        entry.message,
        format!(
            "Trx step error occurred for user: {} while attempting to {}: database error: injected failure at step 2",
            world.owner.id, step
        )
    );
}

#[tokio::test]
async fn every_step_position_is_atomic() {
    // closeAccount on the owner plans well over a dozen steps
    for n in 0..12 {
        let world = World::new();
        let before = world.store.snapshot();
        world.store.fail_step(n);

        let result = world
            .engine
            .execute(
                &ctx(&world.sa),
                CascadeKind::CloseAccount,
                &input("user", &world.owner.id),
            )
            .await;

        assert!(result.is_err(), "step {} should fail", n);
        assert_eq!(world.store.snapshot(), before, "step {} leaked writes", n);
    }
}

#[tokio::test]
async fn commit_failure_is_reported_without_a_step() {
    let world = World::new();
    let before = world.store.snapshot();
    world.store.fail_commit();

    let fault = world
        .engine
        .execute(
            &ctx(&world.member),
            CascadeKind::CloseAccount,
            &input("user", &world.member.id),
        )
        .await
        .unwrap_err();

    assert_eq!(fault.message, "Unable to close account. Please try again.");
    assert_eq!(world.store.snapshot(), before);

    let entry = &world.logger.entries()[0];
    assert!(entry.message.starts_with("Trx commit error occurred"));
    assert!(entry.step.is_none());
}

#[tokio::test]
async fn transaction_start_failure_is_a_fault() {
    let world = World::new();
    world.store.fail_begin();

    let fault = world
        .engine
        .execute(
            &ctx(&world.member),
            CascadeKind::CloseAccount,
            &input("user", &world.member.id),
        )
        .await
        .unwrap_err();

    assert_eq!(fault.kind, CascadeKind::CloseAccount);
    assert!(world.logger.entries()[0]
        .message
        .starts_with("Trx start error occurred"));
}

#[tokio::test]
async fn rejected_mutations_never_open_a_transaction() {
    let world = World::new();
    // Would fail the first write if one were attempted
    world.store.fail_step(0);

    let payload = world
        .engine
        .execute(
            &ctx(&world.member),
            CascadeKind::ArchiveOrganization,
            &input("organization", &world.tbs.id),
        )
        .await
        .unwrap();

    assert!(!payload.is_success());
    assert_eq!(world.logger.entries()[0].outcome, AuditOutcome::Rejected);
}
