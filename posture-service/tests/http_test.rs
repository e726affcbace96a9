mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use posture_service::cascade::{CascadeEngine, CascadeSettings, GlobalId};
use posture_service::config::{MongoConfig, PostureConfig, StoreBackend};
use posture_service::services::MemoryAuditLogger;
use posture_service::startup::{build_router, AppState};
use serde_json::{json, Value};
use service_core::config::Config;
use tower::ServiceExt;

use common::World;

fn config() -> PostureConfig {
    PostureConfig {
        common: Config {
            port: 0,
            environment: "test".to_string(),
        },
        mongodb: MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "tracker_test".to_string(),
        },
        store: StoreBackend::Memory,
        cascade: CascadeSettings::default(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        audit_persist: false,
    }
}

fn router(world: &World) -> axum::Router {
    let engine = CascadeEngine::new(
        Arc::new(world.store.clone()),
        world.logger.clone(),
        CascadeSettings::default(),
    );
    build_router(AppState {
        config: config(),
        engine: Arc::new(engine),
    })
}

fn mutation(operation: &str, actor: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(format!("/mutations/{}", operation))
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(actor) = actor {
        builder = builder.header("X-User-ID", actor);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_reports_registered_operations() {
    let world = World::new();

    let response = router(&world)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert!(response.headers().contains_key("x-request-id"));

    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(
        body["operations"],
        json!(["closeAccount", "archiveOrganization", "removeDomain"])
    );
}

#[tokio::test]
async fn close_account_over_http() {
    let world = World::new();
    let target = GlobalId::new("user", &world.member.id).encode();

    let response = router(&world)
        .oneshot(mutation(
            "closeAccount",
            Some(&world.member.id),
            json!({ "target": target }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({ "type": "CascadeResult", "status": "Successfully closed account." })
    );
    assert!(!world.store.snapshot().accounts.contains_key(&world.member.id));
}

#[tokio::test]
async fn rejections_are_200_payloads_in_the_caller_language() {
    let world = World::new();
    let target = GlobalId::new("user", &world.member.id).encode();

    let mut request = mutation(
        "closeAccount",
        Some(&world.outsider.id),
        json!({ "target": target }),
    );
    request
        .headers_mut()
        .insert(header::ACCEPT_LANGUAGE, "fr-CA,fr;q=0.9".parse().unwrap());
    request
        .headers_mut()
        .insert("x-request-id", "req-42".parse().unwrap());

    let response = router(&world).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-42");
    let body = json_body(response).await;
    assert_eq!(body["type"], "CascadeError");
    assert_eq!(body["code"], 403);
    assert_eq!(
        body["description"],
        "Erreur de permission : Impossible de fermer le compte d'un autre utilisateur."
    );

    assert_eq!(world.logger.entries()[0].request_id, "req-42");
}

#[tokio::test]
async fn faults_are_500_with_generic_message() {
    let world = World::new();
    world.store.fail_step(0);
    let target = GlobalId::new("user", &world.member.id).encode();

    let response = router(&world)
        .oneshot(mutation(
            "closeAccount",
            Some(&world.member.id),
            json!({ "target": target }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Unable to close account. Please try again." })
    );
}

#[tokio::test]
async fn unknown_operation_is_404() {
    let world = World::new();

    let response = router(&world)
        .oneshot(mutation(
            "dropDatabase",
            Some(&world.sa.id),
            json!({ "target": "x" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(world.logger.entries().is_empty());
}

#[tokio::test]
async fn missing_actor_is_401() {
    let world = World::new();

    let response = router(&world)
        .oneshot(mutation("closeAccount", None, json!({ "target": "x" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_target_fails_validation() {
    let world = World::new();

    let response = router(&world)
        .oneshot(mutation(
            "closeAccount",
            Some(&world.sa.id),
            json!({ "target": "" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn separate_loggers_do_not_share_entries() {
    let world = World::new();
    let other = Arc::new(MemoryAuditLogger::new());
    let engine = CascadeEngine::new(
        Arc::new(world.store.clone()),
        other.clone(),
        CascadeSettings::default(),
    );
    let app = build_router(AppState {
        config: config(),
        engine: Arc::new(engine),
    });

    let target = GlobalId::new("user", &world.member.id).encode();
    app.oneshot(mutation(
        "closeAccount",
        Some(&world.member.id),
        json!({ "target": target }),
    ))
    .await
    .unwrap();

    assert_eq!(other.entries().len(), 1);
    assert!(world.logger.entries().is_empty());
}
