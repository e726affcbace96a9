//! Runs against a real MongoDB replica set (transactions need one).
//!
//! `MONGODB_URI=mongodb://localhost:27017/?replicaSet=rs0 cargo test -- --ignored`

use std::sync::Arc;

use posture_service::cascade::{CascadeEngine, CascadeKind, CascadeSettings, GlobalId, RequestContext};
use posture_service::dtos::MutationInput;
use posture_service::models::{Account, Affiliation, Claim, Domain, Organization, Role, WebScan};
use posture_service::services::{MemoryAuditLogger, MongoDb, MongoStore};
use service_core::mongodb::bson::doc;

#[tokio::test]
#[ignore = "requires a MongoDB replica set"]
async fn archive_runs_in_a_mongo_transaction() {
    let uri = std::env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017/?replicaSet=rs0".to_string());
    let database = format!("posture_test_{}", uuid::Uuid::new_v4().simple());
    let db = MongoDb::connect(&uri, &database).await.unwrap();
    db.initialize_indexes().await.unwrap();

    let owner = Account::new("owner@tbs-sct.gc.ca", "Owner");
    let org = Organization::new("TBS", "Treasury Board");
    let domain = Domain::new("tbs.gc.ca");

    db.accounts().insert_one(&owner, None).await.unwrap();
    db.organizations().insert_one(&org, None).await.unwrap();
    db.affiliations()
        .insert_one(Affiliation::new(&owner.id, &org.id, Role::Admin).owner(), None)
        .await
        .unwrap();
    db.domains().insert_one(&domain, None).await.unwrap();
    db.claims()
        .insert_one(Claim::new(&org.id, &domain.id), None)
        .await
        .unwrap();
    db.web_scans()
        .insert_one(WebScan::new(&domain.id, "pass"), None)
        .await
        .unwrap();

    let logger = Arc::new(MemoryAuditLogger::new());
    let engine = CascadeEngine::new(
        Arc::new(MongoStore::new(db.clone())),
        logger.clone(),
        CascadeSettings::default(),
    );

    let payload = engine
        .execute(
            &RequestContext::new(&owner.id),
            CascadeKind::ArchiveOrganization,
            &MutationInput {
                target: GlobalId::new("organization", &org.id).encode(),
                organization: None,
            },
        )
        .await
        .unwrap();
    assert!(payload.is_success());

    assert!(db
        .organizations()
        .find_one(doc! { "_id": &org.id }, None)
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        db.web_scans()
            .count_documents(doc! { "domain_id": &domain.id }, None)
            .await
            .unwrap(),
        0
    );
    assert_eq!(logger.entries().len(), 1);

    db.database().drop(None).await.unwrap();
}
