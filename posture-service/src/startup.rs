use crate::cascade::{CascadeEngine, CascadeStore};
use crate::config::{PostureConfig, StoreBackend};
use crate::handlers;
use crate::services::{
    AuditLogger, MemoryStore, MongoAuditLogger, MongoDb, MongoStore, TracingAuditLogger,
};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: PostureConfig,
    pub engine: Arc<CascadeEngine>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/mutations/:operation", post(handlers::run_mutation))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Wire the store and audit sink selected by configuration into an engine.
pub async fn build_engine(config: &PostureConfig) -> Result<CascadeEngine, AppError> {
    let store: Arc<dyn CascadeStore>;
    let logger: Arc<dyn AuditLogger>;

    match config.store {
        StoreBackend::Mongo => {
            let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database).await?;
            db.initialize_indexes().await.map_err(|e| {
                tracing::error!("Failed to initialize database indexes: {}", e);
                e
            })?;

            logger = if config.audit_persist {
                Arc::new(MongoAuditLogger::new(db.clone()))
            } else {
                Arc::new(TracingAuditLogger)
            };
            store = Arc::new(MongoStore::new(db));
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            store = Arc::new(MemoryStore::new());
            logger = Arc::new(TracingAuditLogger);
        }
    }

    Ok(CascadeEngine::new(store, logger, config.cascade))
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(config: PostureConfig) -> Result<Self, AppError> {
        let engine = build_engine(&config).await?;
        tracing::info!(
            operations = ?engine.operations(),
            protect_last_super_admin = config.cascade.protect_last_super_admin,
            "Cascade engine ready"
        );

        let state = AppState {
            config: config.clone(),
            engine: Arc::new(engine),
        };
        let app = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
