use uuid::Uuid;

use crate::i18n::Locale;

/// Per-request values threaded explicitly through the cascade pipeline.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Account id of the authenticated caller
    pub actor_id: String,
    pub locale: Locale,
    pub request_id: String,
}

impl RequestContext {
    pub fn new(actor_id: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            locale: Locale::En,
            request_id: Uuid::new_v4().to_string(),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }
}
