//! Audit logging for cascade mutations.
//!
//! Every mutation invocation produces exactly one `AuditEntry`. The logger is
//! injected into the reporter so tests can capture entries and deployments can
//! choose whether entries are also persisted.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MongoDb;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuditLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Rejected,
    Fault,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuditOutcome::Success => "success",
            AuditOutcome::Rejected => "rejected",
            AuditOutcome::Fault => "fault",
        })
    }
}

/// One audit line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub level: AuditLevel,
    /// Operation name, e.g. `closeAccount`
    pub operation: String,
    pub actor: String,
    /// Target key, or the raw id when it could not be decoded
    pub target: String,
    pub outcome: AuditOutcome,
    /// Failing transaction step, for faults raised inside the transaction
    pub step: Option<String>,
    pub request_id: String,
    pub message: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        level: AuditLevel,
        outcome: AuditOutcome,
        operation: impl Into<String>,
        actor: impl Into<String>,
        target: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            level,
            operation: operation.into(),
            actor: actor.into(),
            target: target.into(),
            outcome,
            step: None,
            request_id: String::new(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_step(mut self, step: Option<String>) -> Self {
        self.step = step;
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }
}

pub trait AuditLogger: Send + Sync {
    fn log(&self, entry: &AuditEntry);
}

/// Writes entries as structured tracing events.
#[derive(Debug, Clone, Default)]
pub struct TracingAuditLogger;

impl AuditLogger for TracingAuditLogger {
    fn log(&self, entry: &AuditEntry) {
        emit(entry);
    }
}

fn emit(entry: &AuditEntry) {
    match entry.level {
        AuditLevel::Info => tracing::info!(
            operation = %entry.operation,
            actor = %entry.actor,
            target_id = %entry.target,
            outcome = %entry.outcome,
            request_id = %entry.request_id,
            "{}",
            entry.message
        ),
        AuditLevel::Warn => tracing::warn!(
            operation = %entry.operation,
            actor = %entry.actor,
            target_id = %entry.target,
            outcome = %entry.outcome,
            request_id = %entry.request_id,
            "{}",
            entry.message
        ),
        AuditLevel::Error => tracing::error!(
            operation = %entry.operation,
            actor = %entry.actor,
            target_id = %entry.target,
            outcome = %entry.outcome,
            step = entry.step.as_deref().unwrap_or(""),
            request_id = %entry.request_id,
            "{}",
            entry.message
        ),
    }
}

/// Traces every entry and persists a copy to `audit_logs` without blocking the caller.
#[derive(Clone)]
pub struct MongoAuditLogger {
    db: MongoDb,
}

impl MongoAuditLogger {
    pub fn new(db: MongoDb) -> Self {
        Self { db }
    }
}

impl AuditLogger for MongoAuditLogger {
    fn log(&self, entry: &AuditEntry) {
        emit(entry);

        let db = self.db.clone();
        let entry = entry.clone();
        tokio::spawn(async move {
            if let Err(e) = db.audit_logs().insert_one(&entry, None).await {
                tracing::error!(
                    error = %e,
                    operation = %entry.operation,
                    "Failed to write audit log"
                );
            }
        });
    }
}

/// Keeps entries in memory for inspection.
#[derive(Debug, Default)]
pub struct MemoryAuditLogger {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl AuditLogger for MemoryAuditLogger {
    fn log(&self, entry: &AuditEntry) {
        emit(entry);
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
    }
}
