use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::ACCEPT_LANGUAGE, request::Parts};
use service_core::error::AppError;
use service_core::middleware::tracing::{RequestId, REQUEST_ID_HEADER};

use crate::cascade::RequestContext;
use crate::i18n::Locale;

/// Account id of the caller, set by the authenticating gateway.
pub const ACTOR_HEADER: &str = "X-User-ID";

/// Builds the per-request cascade context from headers.
///
/// The gateway in front of this service authenticates the caller; here the
/// actor id is taken as given.
#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::AuthError(anyhow::anyhow!("Missing {} header", ACTOR_HEADER))
            })?;

        let locale = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .map(Locale::from_accept_language)
            .unwrap_or_default();

        let mut ctx = RequestContext::new(actor_id).with_locale(locale);

        let request_id = parts
            .extensions
            .get::<RequestId>()
            .map(|id| id.0.clone())
            .or_else(|| {
                parts
                    .headers
                    .get(REQUEST_ID_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            });
        if let Some(request_id) = request_id {
            ctx = ctx.with_request_id(request_id);
        }

        Ok(ctx)
    }
}
