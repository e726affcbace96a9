//! Opaque entity ids as exposed to clients: base64 of `"<type>:<key>"`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::dtos::MutationInput;

pub const USER: &str = "user";
pub const ORGANIZATION: &str = "organization";
pub const DOMAIN: &str = "domain";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GlobalIdError {
    #[error("id is not valid base64")]
    Base64,
    #[error("id is not valid utf-8")]
    Utf8,
    #[error("id has no type separator")]
    MissingSeparator,
    #[error("id has an empty key")]
    EmptyKey,
    #[error("expected a {expected} id, found a {found} id")]
    WrongType {
        expected: &'static str,
        found: String,
    },
    #[error("missing {0} id")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalId {
    pub type_name: String,
    pub key: String,
}

impl GlobalId {
    pub fn new(type_name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            key: key.into(),
        }
    }

    pub fn encode(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.type_name, self.key))
    }

    pub fn decode(raw: &str) -> Result<Self, GlobalIdError> {
        let bytes = STANDARD
            .decode(raw.trim())
            .map_err(|_| GlobalIdError::Base64)?;
        let text = String::from_utf8(bytes).map_err(|_| GlobalIdError::Utf8)?;
        let (type_name, key) = text
            .split_once(':')
            .ok_or(GlobalIdError::MissingSeparator)?;

        if key.is_empty() {
            return Err(GlobalIdError::EmptyKey);
        }

        Ok(Self::new(type_name, key))
    }

    /// Decode and check the type, returning the bare key.
    pub fn decode_key(raw: &str, expected: &'static str) -> Result<String, GlobalIdError> {
        let id = Self::decode(raw)?;
        if id.type_name != expected {
            return Err(GlobalIdError::WrongType {
                expected,
                found: id.type_name,
            });
        }
        Ok(id.key)
    }
}

/// Decoded keys of a mutation's target and, for edge removals, its organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetIds {
    pub key: String,
    pub organization: Option<String>,
}

impl TargetIds {
    pub fn decode(
        input: &MutationInput,
        target_type: &'static str,
        with_organization: bool,
    ) -> Result<Self, GlobalIdError> {
        let key = GlobalId::decode_key(&input.target, target_type)?;

        let organization = if with_organization {
            let raw = input
                .organization
                .as_deref()
                .ok_or(GlobalIdError::Missing(ORGANIZATION))?;
            Some(GlobalId::decode_key(raw, ORGANIZATION)?)
        } else {
            None
        };

        Ok(Self { key, organization })
    }
}
