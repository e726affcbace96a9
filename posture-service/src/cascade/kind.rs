use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::i18n::Message;

/// The cascade mutations this service can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CascadeKind {
    CloseAccount,
    ArchiveOrganization,
    RemoveDomain,
}

#[derive(Debug, Error)]
#[error("Unknown mutation: {0}")]
pub struct UnknownOperation(pub String);

impl CascadeKind {
    pub const ALL: [CascadeKind; 3] = [
        CascadeKind::CloseAccount,
        CascadeKind::ArchiveOrganization,
        CascadeKind::RemoveDomain,
    ];

    pub fn operation_name(&self) -> &'static str {
        match self {
            CascadeKind::CloseAccount => "closeAccount",
            CascadeKind::ArchiveOrganization => "archiveOrganization",
            CascadeKind::RemoveDomain => "removeDomain",
        }
    }

    /// Generic message returned for any unexpected fault.
    pub fn failure_message(&self) -> Message {
        match self {
            CascadeKind::CloseAccount => Message::CloseAccountFailed,
            CascadeKind::ArchiveOrganization => Message::ArchiveOrganizationFailed,
            CascadeKind::RemoveDomain => Message::RemoveDomainFailed,
        }
    }
}

impl fmt::Display for CascadeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation_name())
    }
}

impl FromStr for CascadeKind {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CascadeKind::ALL
            .into_iter()
            .find(|kind| kind.operation_name() == s)
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_names_parse_back() {
        for kind in CascadeKind::ALL {
            assert_eq!(kind.operation_name().parse::<CascadeKind>().unwrap(), kind);
        }
        assert!("deleteEverything".parse::<CascadeKind>().is_err());
    }
}
