mod common;

use common::{ctx, input, World};
use posture_service::cascade::{CascadeKind, CascadeSettings, MutationPayload, UserError};
use posture_service::services::audit::AuditLevel;
use posture_service::services::ReadFault;

#[tokio::test]
async fn owner_archives_organization() {
    let world = World::new();

    let payload = world
        .engine
        .execute(
            &ctx(&world.owner),
            CascadeKind::ArchiveOrganization,
            &input("organization", &world.tbs.id),
        )
        .await
        .unwrap();

    assert_eq!(
        payload,
        MutationPayload::Result {
            status: "Successfully archived organization: TBS.".to_string()
        }
    );

    let state = world.store.snapshot();
    assert!(!state.organizations.contains_key(&world.tbs.id));
    assert!(state.affiliations.values().all(|a| a.org_id != world.tbs.id));
    assert!(state.claims.values().all(|c| c.org_id != world.tbs.id));
    assert!(state.ownerships.values().all(|o| o.org_id != world.tbs.id));

    // Sole claimant: domain and every artifact removed
    assert!(!state.domains.contains_key(&world.sole.id));
    assert!(state.web_scans.values().all(|s| s.domain_id != world.sole.id));
    assert!(state.dns_scans.values().all(|s| s.domain_id != world.sole.id));
    assert!(state
        .dmarc_summaries
        .values()
        .all(|s| s.domain_id != world.sole.id));

    // Shared: only the edge goes
    assert!(state.domains.contains_key(&world.shared.id));
    assert!(state.web_scans.values().any(|s| s.domain_id == world.shared.id));
    assert!(state
        .ownerships
        .values()
        .any(|o| o.org_id == world.other.id && o.domain_id == world.shared.id));

    // Accounts are never deleted by an archive
    assert_eq!(state.accounts.len(), 4);

    let entries = world.logger.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].message,
        format!(
            "User: {} successfully archived org: {}.",
            world.owner.id, world.tbs.id
        )
    );
}

#[tokio::test]
async fn non_owner_cannot_archive() {
    let world = World::new();
    let before = world.store.snapshot();

    let payload = world
        .engine
        .execute(
            &ctx(&world.member),
            CascadeKind::ArchiveOrganization,
            &input("organization", &world.tbs.id),
        )
        .await
        .unwrap();

    assert_eq!(
        payload,
        MutationPayload::Error(UserError {
            code: 403,
            description:
                "Permission Denied: Please contact super admin for help with archiving organization."
                    .to_string(),
        })
    );
    assert_eq!(world.store.snapshot(), before);

    let entries = world.logger.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].level, AuditLevel::Warn);
    assert!(entries[0].message.contains(&world.member.id));
    assert!(entries[0].message.contains(&world.tbs.id));
}

#[tokio::test]
async fn verified_organizations_need_a_super_admin() {
    let world = World::new();
    let tbs_id = world.tbs.id.clone();
    world.store.seed(|s| {
        if let Some(org) = s.organizations.get_mut(&tbs_id) {
            org.verified = true;
        }
    });

    let payload = world
        .engine
        .execute(
            &ctx(&world.owner),
            CascadeKind::ArchiveOrganization,
            &input("organization", &world.tbs.id),
        )
        .await
        .unwrap();
    match payload {
        MutationPayload::Error(err) => assert_eq!(err.code, 403),
        other => panic!("unexpected payload: {:?}", other),
    }
    assert!(world.logger.entries()[0].message.contains("verified"));

    let payload = world
        .engine
        .execute(
            &ctx(&world.sa),
            CascadeKind::ArchiveOrganization,
            &input("organization", &world.tbs.id),
        )
        .await
        .unwrap();
    assert!(payload.is_success());
    assert!(!world.store.snapshot().organizations.contains_key(&world.tbs.id));
}

#[tokio::test]
async fn unknown_organization_is_a_user_error() {
    let world = World::new();

    let payload = world
        .engine
        .execute(
            &ctx(&world.sa),
            CascadeKind::ArchiveOrganization,
            &input("organization", "missing"),
        )
        .await
        .unwrap();

    assert_eq!(
        payload,
        MutationPayload::Error(UserError {
            code: 400,
            description: "Unable to archive unknown organization.".to_string(),
        })
    );
}

#[tokio::test]
async fn last_claimant_takes_the_shared_domain() {
    let world = World::new();

    let payload = world
        .engine
        .execute(
            &ctx(&world.sa),
            CascadeKind::ArchiveOrganization,
            &input("organization", &world.other.id),
        )
        .await
        .unwrap();
    assert!(payload.is_success());
    assert!(world.store.snapshot().domains.contains_key(&world.shared.id));

    let payload = world
        .engine
        .execute(
            &ctx(&world.owner),
            CascadeKind::ArchiveOrganization,
            &input("organization", &world.tbs.id),
        )
        .await
        .unwrap();
    assert!(payload.is_success());

    let state = world.store.snapshot();
    assert!(!state.domains.contains_key(&world.shared.id));
    assert!(state.web_scans.values().all(|s| s.domain_id != world.shared.id));
    assert!(state.ownerships.is_empty());
    assert_eq!(world.logger.entries().len(), 2);
}

#[tokio::test]
async fn database_failure_returns_generic_error() {
    let world = World::new();
    world.store.fail_reads(ReadFault::Database);

    let fault = world
        .engine
        .execute(
            &ctx(&world.owner),
            CascadeKind::ArchiveOrganization,
            &input("organization", &world.tbs.id),
        )
        .await
        .unwrap_err();

    assert_eq!(
        fault.to_string(),
        "Unable to archive organization. Please try again."
    );
    let entries = world.logger.entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].message.starts_with("Database error occurred"));
    assert!(entries[0].step.is_none());
}

#[tokio::test]
async fn guard_protects_the_super_admin_organization() {
    let world = World::with_settings(CascadeSettings {
        protect_last_super_admin: true,
    });

    let payload = world
        .engine
        .execute(
            &ctx(&world.sa),
            CascadeKind::ArchiveOrganization,
            &input("organization", &world.sa_org.id),
        )
        .await
        .unwrap();

    match payload {
        MutationPayload::Error(err) => assert_eq!(err.code, 400),
        other => panic!("unexpected payload: {:?}", other),
    }
    assert!(world
        .store
        .snapshot()
        .organizations
        .contains_key(&world.sa_org.id));
}
