//! In-process cascade store.
//!
//! Transactions apply their deletes to a private copy of the state and replay
//! them against the live state on commit, which gives the same all-or-nothing
//! behavior as a MongoDB transaction. Two overlapping transactions that touch
//! the same document fail the later commit with a write conflict. Fault
//! injection hooks let tests fail a read, a given step, or the commit.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::cascade::store::{
    ArtifactCounts, CascadeStore, CascadeTransaction, StoreError, WriteOp,
};
use crate::models::{
    Account, Affiliation, Claim, DmarcSummary, DnsScan, Domain, Organization, Ownership, Role,
    WebScan,
};

/// All collections, keyed by document id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryState {
    pub accounts: BTreeMap<String, Account>,
    pub organizations: BTreeMap<String, Organization>,
    pub affiliations: BTreeMap<String, Affiliation>,
    pub domains: BTreeMap<String, Domain>,
    pub claims: BTreeMap<String, Claim>,
    pub ownerships: BTreeMap<String, Ownership>,
    pub web_scans: BTreeMap<String, WebScan>,
    pub dns_scans: BTreeMap<String, DnsScan>,
    pub dmarc_summaries: BTreeMap<String, DmarcSummary>,
}

impl MemoryState {
    pub fn insert_account(&mut self, account: Account) -> &mut Self {
        self.accounts.insert(account.id.clone(), account);
        self
    }

    pub fn insert_organization(&mut self, org: Organization) -> &mut Self {
        self.organizations.insert(org.id.clone(), org);
        self
    }

    pub fn insert_affiliation(&mut self, affiliation: Affiliation) -> &mut Self {
        self.affiliations.insert(affiliation.id.clone(), affiliation);
        self
    }

    pub fn insert_domain(&mut self, domain: Domain) -> &mut Self {
        self.domains.insert(domain.id.clone(), domain);
        self
    }

    pub fn insert_claim(&mut self, claim: Claim) -> &mut Self {
        self.claims.insert(claim.id.clone(), claim);
        self
    }

    pub fn insert_ownership(&mut self, ownership: Ownership) -> &mut Self {
        self.ownerships.insert(ownership.id.clone(), ownership);
        self
    }

    pub fn insert_web_scan(&mut self, scan: WebScan) -> &mut Self {
        self.web_scans.insert(scan.id.clone(), scan);
        self
    }

    pub fn insert_dns_scan(&mut self, scan: DnsScan) -> &mut Self {
        self.dns_scans.insert(scan.id.clone(), scan);
        self
    }

    pub fn insert_dmarc_summary(&mut self, summary: DmarcSummary) -> &mut Self {
        self.dmarc_summaries.insert(summary.id.clone(), summary);
        self
    }

    /// Total number of documents across all collections.
    pub fn document_count(&self) -> usize {
        self.accounts.len()
            + self.organizations.len()
            + self.affiliations.len()
            + self.domains.len()
            + self.claims.len()
            + self.ownerships.len()
            + self.web_scans.len()
            + self.dns_scans.len()
            + self.dmarc_summaries.len()
    }

    fn apply(&mut self, op: &WriteOp) -> u64 {
        match op {
            WriteOp::DeleteDmarcSummaries { domain_id } => {
                remove_where(&mut self.dmarc_summaries, |s| &s.domain_id == domain_id)
            }
            WriteOp::DeleteDomainOwnerships { domain_id } => {
                remove_where(&mut self.ownerships, |o| &o.domain_id == domain_id)
            }
            WriteOp::DeleteWebScans { domain_id } => {
                remove_where(&mut self.web_scans, |s| &s.domain_id == domain_id)
            }
            WriteOp::DeleteDnsScans { domain_id } => {
                remove_where(&mut self.dns_scans, |s| &s.domain_id == domain_id)
            }
            WriteOp::DeleteDomain { domain_id } => {
                self.domains.remove(domain_id).map_or(0, |_| 1)
            }
            WriteOp::DeleteClaim { org_id, domain_id } => remove_where(&mut self.claims, |c| {
                &c.org_id == org_id && &c.domain_id == domain_id
            }),
            WriteOp::DeleteOrgDomainOwnership { org_id, domain_id } => {
                remove_where(&mut self.ownerships, |o| {
                    &o.org_id == org_id && &o.domain_id == domain_id
                })
            }
            WriteOp::DeleteOrgClaims { org_id } => {
                remove_where(&mut self.claims, |c| &c.org_id == org_id)
            }
            WriteOp::DeleteOrgOwnerships { org_id } => {
                remove_where(&mut self.ownerships, |o| &o.org_id == org_id)
            }
            WriteOp::DeleteOrgAffiliations { org_id } => {
                remove_where(&mut self.affiliations, |a| &a.org_id == org_id)
            }
            WriteOp::DeleteOrganization { org_id } => {
                self.organizations.remove(org_id).map_or(0, |_| 1)
            }
            WriteOp::DeleteAccountAffiliations { account_id } => {
                remove_where(&mut self.affiliations, |a| &a.account_id == account_id)
            }
            WriteOp::DeleteAccount { account_id } => {
                self.accounts.remove(account_id).map_or(0, |_| 1)
            }
        }
    }
}

/// Documents a write op touches, for write-conflict detection.
///
/// Claim and ownership deletes also touch their domain, so two cascades that
/// each drop one claim of a shared domain conflict instead of both leaving it
/// behind.
fn conflict_keys(op: &WriteOp) -> Vec<String> {
    let domain = |id: &str| format!("domain:{}", id);
    let org = |id: &str| format!("org:{}", id);
    match op {
        WriteOp::DeleteDmarcSummaries { domain_id }
        | WriteOp::DeleteDomainOwnerships { domain_id }
        | WriteOp::DeleteWebScans { domain_id }
        | WriteOp::DeleteDnsScans { domain_id }
        | WriteOp::DeleteDomain { domain_id } => vec![domain(domain_id)],
        WriteOp::DeleteClaim { org_id, domain_id }
        | WriteOp::DeleteOrgDomainOwnership { org_id, domain_id } => {
            vec![org(org_id), domain(domain_id)]
        }
        WriteOp::DeleteOrgClaims { org_id }
        | WriteOp::DeleteOrgOwnerships { org_id }
        | WriteOp::DeleteOrgAffiliations { org_id }
        | WriteOp::DeleteOrganization { org_id } => vec![org(org_id)],
        WriteOp::DeleteAccountAffiliations { account_id }
        | WriteOp::DeleteAccount { account_id } => vec![format!("account:{}", account_id)],
    }
}

fn remove_where<T>(map: &mut BTreeMap<String, T>, pred: impl Fn(&T) -> bool) -> u64 {
    let before = map.len();
    map.retain(|_, v| !pred(v));
    (before - map.len()) as u64
}

/// Which class of read failure to inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFault {
    /// Every read fails as a query error
    Database,
    /// List reads fail while iterating; single-document reads and counts succeed
    Cursor,
}

#[derive(Debug, Clone, Copy, Default)]
struct FaultPlan {
    /// Zero-based index of the step that fails
    fail_step: Option<usize>,
    fail_begin: bool,
    fail_commit: bool,
    fail_reads: Option<ReadFault>,
}

/// Live documents plus the commit sequence that last wrote each conflict key.
#[derive(Default)]
struct Shared {
    state: MemoryState,
    written: BTreeMap<String, u64>,
    sequence: u64,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Mutex<Shared>>,
    faults: Arc<Mutex<FaultPlan>>,
    commits: Arc<AtomicU64>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, f: impl FnOnce(&mut MemoryState)) {
        f(&mut lock(&self.shared).state);
    }

    pub fn snapshot(&self) -> MemoryState {
        lock(&self.shared).state.clone()
    }

    pub fn commits(&self) -> u64 {
        self.commits.load(Ordering::SeqCst)
    }

    /// Fail the `n`th transaction step (zero-based).
    pub fn fail_step(&self, n: usize) {
        lock(&self.faults).fail_step = Some(n);
    }

    pub fn fail_begin(&self) {
        lock(&self.faults).fail_begin = true;
    }

    pub fn fail_commit(&self) {
        lock(&self.faults).fail_commit = true;
    }

    pub fn fail_reads(&self, fault: ReadFault) {
        lock(&self.faults).fail_reads = Some(fault);
    }

    pub fn clear_faults(&self) {
        *lock(&self.faults) = FaultPlan::default();
    }

    fn read_fault(&self, listing: bool) -> Result<(), StoreError> {
        match lock(&self.faults).fail_reads {
            Some(ReadFault::Database) => Err(StoreError::database(anyhow::anyhow!(
                "injected query failure"
            ))),
            Some(ReadFault::Cursor) if listing => Err(StoreError::cursor(anyhow::anyhow!(
                "injected cursor failure"
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl CascadeStore for MemoryStore {
    async fn find_account(&self, account_id: &str) -> Result<Option<Account>, StoreError> {
        self.read_fault(false)?;
        Ok(lock(&self.shared).state.accounts.get(account_id).cloned())
    }

    async fn find_organization(&self, org_id: &str) -> Result<Option<Organization>, StoreError> {
        self.read_fault(false)?;
        Ok(lock(&self.shared).state.organizations.get(org_id).cloned())
    }

    async fn find_domain(&self, domain_id: &str) -> Result<Option<Domain>, StoreError> {
        self.read_fault(false)?;
        Ok(lock(&self.shared).state.domains.get(domain_id).cloned())
    }

    async fn account_affiliations(
        &self,
        account_id: &str,
    ) -> Result<Vec<Affiliation>, StoreError> {
        self.read_fault(true)?;
        Ok(lock(&self.shared)
            .state
            .affiliations
            .values()
            .filter(|a| a.account_id == account_id)
            .cloned()
            .collect())
    }

    async fn count_org_affiliations(&self, org_id: &str) -> Result<u64, StoreError> {
        self.read_fault(false)?;
        Ok(lock(&self.shared)
            .state
            .affiliations
            .values()
            .filter(|a| a.org_id == org_id)
            .count() as u64)
    }

    async fn count_super_admin_affiliations(
        &self,
        org_id: Option<&str>,
    ) -> Result<u64, StoreError> {
        self.read_fault(false)?;
        Ok(lock(&self.shared)
            .state
            .affiliations
            .values()
            .filter(|a| a.role == Role::SuperAdmin)
            .filter(|a| org_id.map_or(true, |id| a.org_id == id))
            .count() as u64)
    }

    async fn org_claims(&self, org_id: &str) -> Result<Vec<Claim>, StoreError> {
        self.read_fault(true)?;
        Ok(lock(&self.shared)
            .state
            .claims
            .values()
            .filter(|c| c.org_id == org_id)
            .cloned()
            .collect())
    }

    async fn count_claims(&self, domain_id: &str) -> Result<u64, StoreError> {
        self.read_fault(false)?;
        Ok(lock(&self.shared)
            .state
            .claims
            .values()
            .filter(|c| c.domain_id == domain_id)
            .count() as u64)
    }

    async fn org_ownerships(&self, org_id: &str) -> Result<Vec<Ownership>, StoreError> {
        self.read_fault(true)?;
        Ok(lock(&self.shared)
            .state
            .ownerships
            .values()
            .filter(|o| o.org_id == org_id)
            .cloned()
            .collect())
    }

    async fn artifact_counts(&self, domain_id: &str) -> Result<ArtifactCounts, StoreError> {
        self.read_fault(false)?;
        let shared = lock(&self.shared);
        let state = &shared.state;
        Ok(ArtifactCounts {
            web_scans: state
                .web_scans
                .values()
                .filter(|s| s.domain_id == domain_id)
                .count() as u64,
            dns_scans: state
                .dns_scans
                .values()
                .filter(|s| s.domain_id == domain_id)
                .count() as u64,
            dmarc_summaries: state
                .dmarc_summaries
                .values()
                .filter(|s| s.domain_id == domain_id)
                .count() as u64,
        })
    }

    async fn begin(&self) -> Result<Box<dyn CascadeTransaction>, StoreError> {
        let faults = *lock(&self.faults);
        if faults.fail_begin {
            return Err(StoreError::database(anyhow::anyhow!(
                "injected transaction start failure"
            )));
        }

        let (working, started_at) = {
            let shared = lock(&self.shared);
            (shared.state.clone(), shared.sequence)
        };

        Ok(Box::new(MemoryTransaction {
            store: self.clone(),
            working: Some(working),
            ops: Vec::new(),
            started_at,
            faults,
        }))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

struct MemoryTransaction {
    store: MemoryStore,
    /// `None` once committed or aborted
    working: Option<MemoryState>,
    /// Steps applied so far, replayed on commit
    ops: Vec<WriteOp>,
    /// Commit sequence visible when the transaction began
    started_at: u64,
    faults: FaultPlan,
}

impl MemoryTransaction {
    fn working(&mut self) -> Result<&mut MemoryState, StoreError> {
        self.working
            .as_mut()
            .ok_or_else(|| StoreError::database(anyhow::anyhow!("transaction is not open")))
    }
}

#[async_trait]
impl CascadeTransaction for MemoryTransaction {
    async fn step(&mut self, op: &WriteOp) -> Result<u64, StoreError> {
        let index = self.ops.len();
        if self.faults.fail_step == Some(index) {
            return Err(StoreError::database(anyhow::anyhow!(
                "injected failure at step {}",
                index
            )));
        }
        let deleted = self.working()?.apply(op);
        self.ops.push(op.clone());
        Ok(deleted)
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        if self.faults.fail_commit {
            self.working = None;
            return Err(StoreError::database(anyhow::anyhow!(
                "injected commit failure"
            )));
        }
        if self.working.take().is_none() {
            return Err(StoreError::database(anyhow::anyhow!(
                "transaction is not open"
            )));
        }

        let keys: BTreeSet<String> = self.ops.iter().flat_map(conflict_keys).collect();
        let mut shared = lock(&self.store.shared);
        let started_at = self.started_at;
        if let Some(key) = keys
            .iter()
            .find(|key| shared.written.get(*key).is_some_and(|seq| *seq > started_at))
        {
            return Err(StoreError::database(anyhow::anyhow!(
                "write conflict on {}",
                key
            )));
        }

        for op in &self.ops {
            shared.state.apply(op);
        }
        shared.sequence += 1;
        let sequence = shared.sequence;
        for key in keys {
            shared.written.insert(key, sequence);
        }
        self.store.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn abort(&mut self) -> Result<(), StoreError> {
        self.working = None;
        Ok(())
    }
}
