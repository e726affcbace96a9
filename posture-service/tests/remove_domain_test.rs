mod common;

use common::{ctx, edge_input, input, World};
use posture_service::cascade::{CascadeKind, MutationPayload, UserError};
use posture_service::models::{Affiliation, Role};

#[tokio::test]
async fn sole_claimant_removes_domain_and_artifacts() {
    let world = World::new();

    let payload = world
        .engine
        .execute(
            &ctx(&world.owner),
            CascadeKind::RemoveDomain,
            &edge_input(&world.sole.id, &world.tbs.id),
        )
        .await
        .unwrap();

    assert_eq!(
        payload,
        MutationPayload::Result {
            status: "Successfully removed domain: sole.gc.ca from TBS.".to_string()
        }
    );

    let state = world.store.snapshot();
    assert!(!state.domains.contains_key(&world.sole.id));
    assert!(state.claims.values().all(|c| c.domain_id != world.sole.id));
    assert!(state.ownerships.values().all(|o| o.domain_id != world.sole.id));
    assert!(state.dns_scans.values().all(|s| s.domain_id != world.sole.id));
    // The organization itself is untouched
    assert!(state.organizations.contains_key(&world.tbs.id));
}

#[tokio::test]
async fn shared_domain_keeps_its_other_claimant() {
    let world = World::new();

    let payload = world
        .engine
        .execute(
            &ctx(&world.sa),
            CascadeKind::RemoveDomain,
            &edge_input(&world.shared.id, &world.other.id),
        )
        .await
        .unwrap();
    assert!(payload.is_success());

    let state = world.store.snapshot();
    assert!(state.domains.contains_key(&world.shared.id));
    assert!(state
        .claims
        .values()
        .all(|c| !(c.org_id == world.other.id && c.domain_id == world.shared.id)));
    assert!(state
        .claims
        .values()
        .any(|c| c.org_id == world.tbs.id && c.domain_id == world.shared.id));
    // The remover's ownership edge goes with its claim
    assert!(state.ownerships.values().all(|o| o.org_id != world.other.id));
    assert!(state.web_scans.values().any(|s| s.domain_id == world.shared.id));
}

#[tokio::test]
async fn org_admins_may_remove_domains_but_users_may_not() {
    let world = World::new();
    let admin = posture_service::models::Account::new("admin@tbs-sct.gc.ca", "Admin");
    let (admin_id, tbs_id) = (admin.id.clone(), world.tbs.id.clone());
    world.store.seed(|s| {
        s.insert_account(admin.clone())
            .insert_affiliation(Affiliation::new(&admin_id, &tbs_id, Role::Admin));
    });

    let payload = world
        .engine
        .execute(
            &ctx(&world.member),
            CascadeKind::RemoveDomain,
            &edge_input(&world.sole.id, &world.tbs.id),
        )
        .await
        .unwrap();
    assert_eq!(
        payload,
        MutationPayload::Error(UserError {
            code: 403,
            description:
                "Permission Denied: Please contact organization admin for help with removing domain."
                    .to_string(),
        })
    );
    assert!(world.store.snapshot().domains.contains_key(&world.sole.id));

    let payload = world
        .engine
        .execute(
            &ctx(&admin),
            CascadeKind::RemoveDomain,
            &edge_input(&world.sole.id, &world.tbs.id),
        )
        .await
        .unwrap();
    assert!(payload.is_success());
    assert_eq!(world.logger.entries().len(), 2);
}

#[tokio::test]
async fn domain_must_be_claimed_by_the_organization() {
    let world = World::new();
    let before = world.store.snapshot();

    let payload = world
        .engine
        .execute(
            &ctx(&world.owner),
            CascadeKind::RemoveDomain,
            &edge_input(&world.cra_domain.id, &world.tbs.id),
        )
        .await
        .unwrap();

    assert_eq!(
        payload,
        MutationPayload::Error(UserError {
            code: 400,
            description: "Unable to remove domain that does not belong to the given organization."
                .to_string(),
        })
    );
    assert_eq!(world.store.snapshot(), before);
}

#[tokio::test]
async fn missing_records_are_user_errors() {
    let world = World::new();

    let payload = world
        .engine
        .execute(
            &ctx(&world.sa),
            CascadeKind::RemoveDomain,
            &edge_input(&world.sole.id, "missing-org"),
        )
        .await
        .unwrap();
    assert_eq!(
        payload,
        MutationPayload::Error(UserError {
            code: 400,
            description: "Unable to remove domain from unknown organization.".to_string(),
        })
    );

    let payload = world
        .engine
        .execute(
            &ctx(&world.sa),
            CascadeKind::RemoveDomain,
            &edge_input("missing-domain", &world.tbs.id),
        )
        .await
        .unwrap();
    assert_eq!(
        payload,
        MutationPayload::Error(UserError {
            code: 400,
            description: "Unable to remove unknown domain.".to_string(),
        })
    );
}

#[tokio::test]
async fn organization_id_is_required() {
    let world = World::new();

    let payload = world
        .engine
        .execute(
            &ctx(&world.owner),
            CascadeKind::RemoveDomain,
            &input("domain", &world.sole.id),
        )
        .await
        .unwrap();

    match payload {
        MutationPayload::Error(err) => {
            assert_eq!(err.code, 400);
            assert_eq!(err.description, "Unable to decode the supplied id.");
        }
        other => panic!("unexpected payload: {:?}", other),
    }
    assert!(world.logger.entries()[0].message.contains("missing organization id"));
}
