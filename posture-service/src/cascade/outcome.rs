use std::fmt;

use serde::Serialize;
use thiserror::Error;

use super::kind::CascadeKind;
use super::store::StoreError;
use crate::i18n::Message;

/// What the caller receives when the mutation ran to a decision.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum MutationPayload {
    #[serde(rename = "CascadeResult")]
    Result { status: String },
    #[serde(rename = "CascadeError")]
    Error(UserError),
}

impl MutationPayload {
    pub fn is_success(&self) -> bool {
        matches!(self, MutationPayload::Result { .. })
    }
}

/// Expected, user-correctable failure.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserError {
    pub code: u16,
    pub description: String,
}

/// Unexpected failure. Only the generic localized message crosses this boundary.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CascadeFault {
    pub kind: CascadeKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionCode {
    BadRequest,
    Forbidden,
}

impl RejectionCode {
    pub fn as_u16(&self) -> u16 {
        match self {
            RejectionCode::BadRequest => 400,
            RejectionCode::Forbidden => 403,
        }
    }
}

/// A precondition failed; `reason` goes to the audit log, `message` to the caller.
#[derive(Debug, Clone)]
pub struct Rejection {
    pub code: RejectionCode,
    pub message: Message,
    pub reason: String,
}

impl Rejection {
    pub fn bad_request(message: Message, reason: impl Into<String>) -> Self {
        Self {
            code: RejectionCode::BadRequest,
            message,
            reason: reason.into(),
        }
    }

    pub fn forbidden(message: Message, reason: impl Into<String>) -> Self {
        Self {
            code: RejectionCode::Forbidden,
            message,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    Database,
    Cursor,
    TransactionStart,
    Step,
    Commit,
    Unregistered,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FaultKind::Database => "Database",
            FaultKind::Cursor => "Cursor",
            FaultKind::TransactionStart => "Trx start",
            FaultKind::Step => "Trx step",
            FaultKind::Commit => "Trx commit",
            FaultKind::Unregistered => "Dispatch",
        })
    }
}

#[derive(Debug, Clone)]
pub struct Fault {
    pub kind: FaultKind,
    /// Label of the failing transaction step, when one was running.
    pub step: Option<String>,
    pub cause: String,
}

impl Fault {
    pub fn new(kind: FaultKind, step: Option<String>, cause: impl Into<String>) -> Self {
        Self {
            kind,
            step,
            cause: cause.into(),
        }
    }
}

impl From<StoreError> for Fault {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(e) => Fault::new(FaultKind::Database, None, e.to_string()),
            StoreError::Cursor(e) => Fault::new(FaultKind::Cursor, None, e.to_string()),
        }
    }
}

/// Successful end of a cascade.
#[derive(Debug, Clone)]
pub struct Completed {
    pub message: Message,
    pub reason: String,
    pub steps: usize,
    pub deleted: u64,
}

/// Early termination of the pipeline.
#[derive(Debug, Clone)]
pub enum Stop {
    Rejected(Rejection),
    Faulted(Fault),
}

impl From<Rejection> for Stop {
    fn from(r: Rejection) -> Self {
        Stop::Rejected(r)
    }
}

impl From<Fault> for Stop {
    fn from(f: Fault) -> Self {
        Stop::Faulted(f)
    }
}

impl From<StoreError> for Stop {
    fn from(err: StoreError) -> Self {
        Stop::Faulted(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes_as_tagged_union() {
        let ok = MutationPayload::Result {
            status: "Successfully closed account.".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            serde_json::json!({ "type": "CascadeResult", "status": "Successfully closed account." })
        );

        let err = MutationPayload::Error(UserError {
            code: 403,
            description: "nope".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({ "type": "CascadeError", "code": 403, "description": "nope" })
        );
    }

    #[test]
    fn store_errors_keep_their_class() {
        let fault: Fault = StoreError::cursor(anyhow::anyhow!("socket closed")).into();
        assert_eq!(fault.kind, FaultKind::Cursor);
        assert!(fault.step.is_none());

        let fault: Fault = StoreError::database(anyhow::anyhow!("timeout")).into();
        assert_eq!(fault.kind, FaultKind::Database);
    }
}
