use std::collections::HashMap;
use std::sync::Arc;

use super::{ArchiveOrganization, CascadeMutation, CloseAccount, RemoveDomain};
use crate::cascade::kind::CascadeKind;

/// Operation name to handler table, built once at startup.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    handlers: HashMap<CascadeKind, Arc<dyn CascadeMutation>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every mutation this service ships.
    pub fn standard() -> Self {
        Self::new()
            .register(CloseAccount)
            .register(ArchiveOrganization)
            .register(RemoveDomain)
    }

    pub fn register(mut self, mutation: impl CascadeMutation + 'static) -> Self {
        self.handlers.insert(mutation.kind(), Arc::new(mutation));
        self
    }

    pub fn get(&self, kind: CascadeKind) -> Option<Arc<dyn CascadeMutation>> {
        self.handlers.get(&kind).cloned()
    }

    pub fn operations(&self) -> Vec<CascadeKind> {
        CascadeKind::ALL
            .into_iter()
            .filter(|kind| self.handlers.contains_key(kind))
            .collect()
    }
}
