use crate::models::{
    Account, Affiliation, Claim, DmarcSummary, DnsScan, Domain, Organization, Ownership, WebScan,
};
use crate::services::audit::AuditEntry;
use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

pub const ACCOUNTS: &str = "accounts";
pub const ORGANIZATIONS: &str = "organizations";
pub const AFFILIATIONS: &str = "affiliations";
pub const DOMAINS: &str = "domains";
pub const CLAIMS: &str = "claims";
pub const OWNERSHIPS: &str = "ownerships";
pub const WEB_SCANS: &str = "web_scans";
pub const DNS_SCANS: &str = "dns_scans";
pub const DMARC_SUMMARIES: &str = "dmarc_summaries";
pub const AUDIT_LOGS: &str = "audit_logs";

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for posture-service");

        // Every cascade read filters on one of these foreign keys.
        let indexes = [
            (AFFILIATIONS, doc! { "account_id": 1 }, "account_lookup", false),
            (AFFILIATIONS, doc! { "org_id": 1, "role": 1 }, "org_role_lookup", false),
            (CLAIMS, doc! { "org_id": 1, "domain_id": 1 }, "org_domain_unique", true),
            (CLAIMS, doc! { "domain_id": 1 }, "domain_lookup", false),
            (OWNERSHIPS, doc! { "org_id": 1 }, "org_lookup", false),
            (OWNERSHIPS, doc! { "domain_id": 1 }, "domain_lookup", false),
            (WEB_SCANS, doc! { "domain_id": 1 }, "domain_lookup", false),
            (DNS_SCANS, doc! { "domain_id": 1 }, "domain_lookup", false),
            (DMARC_SUMMARIES, doc! { "domain_id": 1 }, "domain_lookup", false),
        ];

        for (collection, keys, name, unique) in indexes {
            let index = IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(name.to_string())
                        .unique(unique)
                        .build(),
                )
                .build();

            self.raw_collection(collection)
                .create_index(index, None)
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Failed to create {} index on {} collection: {}",
                        name,
                        collection,
                        e
                    );
                    AppError::from(e)
                })?;
            tracing::info!("Created index {}.{}", collection, name);
        }

        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn accounts(&self) -> Collection<Account> {
        self.db.collection(ACCOUNTS)
    }

    pub fn organizations(&self) -> Collection<Organization> {
        self.db.collection(ORGANIZATIONS)
    }

    pub fn affiliations(&self) -> Collection<Affiliation> {
        self.db.collection(AFFILIATIONS)
    }

    pub fn domains(&self) -> Collection<Domain> {
        self.db.collection(DOMAINS)
    }

    pub fn claims(&self) -> Collection<Claim> {
        self.db.collection(CLAIMS)
    }

    pub fn ownerships(&self) -> Collection<Ownership> {
        self.db.collection(OWNERSHIPS)
    }

    pub fn web_scans(&self) -> Collection<WebScan> {
        self.db.collection(WEB_SCANS)
    }

    pub fn dns_scans(&self) -> Collection<DnsScan> {
        self.db.collection(DNS_SCANS)
    }

    pub fn dmarc_summaries(&self) -> Collection<DmarcSummary> {
        self.db.collection(DMARC_SUMMARIES)
    }

    pub fn audit_logs(&self) -> Collection<AuditEntry> {
        self.db.collection(AUDIT_LOGS)
    }

    /// Untyped handle, used for deletes where only the filter matters.
    pub fn raw_collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}
