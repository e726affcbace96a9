use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::ClientSession;

use super::database::{
    MongoDb, ACCOUNTS, AFFILIATIONS, CLAIMS, DMARC_SUMMARIES, DNS_SCANS, DOMAINS, ORGANIZATIONS,
    OWNERSHIPS, WEB_SCANS,
};
use crate::cascade::store::{
    ArtifactCounts, CascadeStore, CascadeTransaction, StoreError, WriteOp,
};
use crate::models::{Account, Affiliation, Claim, Domain, Organization, Ownership, Role};

/// MongoDB-backed cascade store. Requires a replica set for transactions.
#[derive(Clone)]
pub struct MongoStore {
    db: MongoDb,
}

impl MongoStore {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CascadeStore for MongoStore {
    async fn find_account(&self, account_id: &str) -> Result<Option<Account>, StoreError> {
        self.db
            .accounts()
            .find_one(doc! { "_id": account_id }, None)
            .await
            .map_err(StoreError::database)
    }

    async fn find_organization(&self, org_id: &str) -> Result<Option<Organization>, StoreError> {
        self.db
            .organizations()
            .find_one(doc! { "_id": org_id }, None)
            .await
            .map_err(StoreError::database)
    }

    async fn find_domain(&self, domain_id: &str) -> Result<Option<Domain>, StoreError> {
        self.db
            .domains()
            .find_one(doc! { "_id": domain_id }, None)
            .await
            .map_err(StoreError::database)
    }

    async fn account_affiliations(
        &self,
        account_id: &str,
    ) -> Result<Vec<Affiliation>, StoreError> {
        let cursor = self
            .db
            .affiliations()
            .find(doc! { "account_id": account_id }, None)
            .await
            .map_err(StoreError::database)?;
        cursor.try_collect().await.map_err(StoreError::cursor)
    }

    async fn count_org_affiliations(&self, org_id: &str) -> Result<u64, StoreError> {
        self.db
            .affiliations()
            .count_documents(doc! { "org_id": org_id }, None)
            .await
            .map_err(StoreError::database)
    }

    async fn count_super_admin_affiliations(
        &self,
        org_id: Option<&str>,
    ) -> Result<u64, StoreError> {
        let mut filter = doc! { "role": Role::SuperAdmin.as_str() };
        if let Some(org_id) = org_id {
            filter.insert("org_id", org_id);
        }
        self.db
            .affiliations()
            .count_documents(filter, None)
            .await
            .map_err(StoreError::database)
    }

    async fn org_claims(&self, org_id: &str) -> Result<Vec<Claim>, StoreError> {
        let cursor = self
            .db
            .claims()
            .find(doc! { "org_id": org_id }, None)
            .await
            .map_err(StoreError::database)?;
        cursor.try_collect().await.map_err(StoreError::cursor)
    }

    async fn count_claims(&self, domain_id: &str) -> Result<u64, StoreError> {
        self.db
            .claims()
            .count_documents(doc! { "domain_id": domain_id }, None)
            .await
            .map_err(StoreError::database)
    }

    async fn org_ownerships(&self, org_id: &str) -> Result<Vec<Ownership>, StoreError> {
        let cursor = self
            .db
            .ownerships()
            .find(doc! { "org_id": org_id }, None)
            .await
            .map_err(StoreError::database)?;
        cursor.try_collect().await.map_err(StoreError::cursor)
    }

    async fn artifact_counts(&self, domain_id: &str) -> Result<ArtifactCounts, StoreError> {
        let filter = doc! { "domain_id": domain_id };
        let web_scans = self
            .db
            .web_scans()
            .count_documents(filter.clone(), None)
            .await
            .map_err(StoreError::database)?;
        let dns_scans = self
            .db
            .dns_scans()
            .count_documents(filter.clone(), None)
            .await
            .map_err(StoreError::database)?;
        let dmarc_summaries = self
            .db
            .dmarc_summaries()
            .count_documents(filter, None)
            .await
            .map_err(StoreError::database)?;

        Ok(ArtifactCounts {
            web_scans,
            dns_scans,
            dmarc_summaries,
        })
    }

    async fn begin(&self) -> Result<Box<dyn CascadeTransaction>, StoreError> {
        let mut session = self
            .db
            .client()
            .start_session(None)
            .await
            .map_err(StoreError::database)?;
        session
            .start_transaction(None)
            .await
            .map_err(StoreError::database)?;

        Ok(Box::new(MongoTransaction {
            db: self.db.clone(),
            session,
        }))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.db
            .health_check()
            .await
            .map_err(|e| StoreError::database(anyhow::anyhow!(e.to_string())))
    }
}

struct MongoTransaction {
    db: MongoDb,
    session: ClientSession,
}

/// Collection and filter a write op deletes from.
fn delete_target(op: &WriteOp) -> (&'static str, Document) {
    match op {
        WriteOp::DeleteDmarcSummaries { domain_id } => {
            (DMARC_SUMMARIES, doc! { "domain_id": domain_id })
        }
        WriteOp::DeleteDomainOwnerships { domain_id } => {
            (OWNERSHIPS, doc! { "domain_id": domain_id })
        }
        WriteOp::DeleteWebScans { domain_id } => (WEB_SCANS, doc! { "domain_id": domain_id }),
        WriteOp::DeleteDnsScans { domain_id } => (DNS_SCANS, doc! { "domain_id": domain_id }),
        WriteOp::DeleteDomain { domain_id } => (DOMAINS, doc! { "_id": domain_id }),
        WriteOp::DeleteClaim { org_id, domain_id } => {
            (CLAIMS, doc! { "org_id": org_id, "domain_id": domain_id })
        }
        WriteOp::DeleteOrgDomainOwnership { org_id, domain_id } => {
            (OWNERSHIPS, doc! { "org_id": org_id, "domain_id": domain_id })
        }
        WriteOp::DeleteOrgClaims { org_id } => (CLAIMS, doc! { "org_id": org_id }),
        WriteOp::DeleteOrgOwnerships { org_id } => (OWNERSHIPS, doc! { "org_id": org_id }),
        WriteOp::DeleteOrgAffiliations { org_id } => (AFFILIATIONS, doc! { "org_id": org_id }),
        WriteOp::DeleteOrganization { org_id } => (ORGANIZATIONS, doc! { "_id": org_id }),
        WriteOp::DeleteAccountAffiliations { account_id } => {
            (AFFILIATIONS, doc! { "account_id": account_id })
        }
        WriteOp::DeleteAccount { account_id } => (ACCOUNTS, doc! { "_id": account_id }),
    }
}

/// Domain a claim delete must write to.
///
/// Claim counts are read before the transaction opens. Bumping a revision on
/// the domain document turns two concurrent cascades that each drop one claim
/// of a shared domain into a write conflict, instead of both leaving the
/// domain with no claimant.
fn guarded_domain(op: &WriteOp) -> Option<&str> {
    match op {
        WriteOp::DeleteClaim { domain_id, .. } => Some(domain_id.as_str()),
        _ => None,
    }
}

#[async_trait]
impl CascadeTransaction for MongoTransaction {
    async fn step(&mut self, op: &WriteOp) -> Result<u64, StoreError> {
        let (collection, filter) = delete_target(op);
        let result = self
            .db
            .raw_collection(collection)
            .delete_many_with_session(filter, None, &mut self.session)
            .await
            .map_err(StoreError::database)?;

        if let Some(domain_id) = guarded_domain(op) {
            self.db
                .raw_collection(DOMAINS)
                .update_one_with_session(
                    doc! { "_id": domain_id },
                    doc! { "$inc": { "claim_revision": 1_i64 } },
                    None,
                    &mut self.session,
                )
                .await
                .map_err(StoreError::database)?;
        }

        Ok(result.deleted_count)
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.session
            .commit_transaction()
            .await
            .map_err(StoreError::database)
    }

    async fn abort(&mut self) -> Result<(), StoreError> {
        self.session
            .abort_transaction()
            .await
            .map_err(StoreError::database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_deletes_are_scoped_to_one_org() {
        let (collection, filter) = delete_target(&WriteOp::DeleteClaim {
            org_id: "o1".to_string(),
            domain_id: "d1".to_string(),
        });
        assert_eq!(collection, CLAIMS);
        assert_eq!(filter, doc! { "org_id": "o1", "domain_id": "d1" });
    }

    #[test]
    fn only_claim_deletes_touch_the_domain() {
        let claim = WriteOp::DeleteClaim {
            org_id: "o1".to_string(),
            domain_id: "d1".to_string(),
        };
        assert_eq!(guarded_domain(&claim), Some("d1"));
        assert_eq!(
            guarded_domain(&WriteOp::DeleteDomain {
                domain_id: "d1".to_string()
            }),
            None
        );
    }

    #[test]
    fn record_deletes_match_on_id() {
        let (collection, filter) = delete_target(&WriteOp::DeleteOrganization {
            org_id: "o1".to_string(),
        });
        assert_eq!(collection, ORGANIZATIONS);
        assert_eq!(filter, doc! { "_id": "o1" });
    }
}
