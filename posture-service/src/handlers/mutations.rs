use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::AppError;

use crate::cascade::RequestContext;
use crate::dtos::{ErrorResponse, MutationInput};
use crate::startup::AppState;
use crate::utils::ValidatedJson;

/// `POST /mutations/:operation`
///
/// Rejections travel inside a 200 payload; only faults change the status code.
#[tracing::instrument(
    name = "mutation",
    skip(state, ctx, input),
    fields(user_id = %ctx.actor_id, request_id = %ctx.request_id)
)]
pub async fn run_mutation(
    State(state): State<AppState>,
    Path(operation): Path<String>,
    ctx: RequestContext,
    ValidatedJson(input): ValidatedJson<MutationInput>,
) -> Result<Response, AppError> {
    let result = state
        .engine
        .dispatch(&ctx, &operation, &input)
        .await
        .map_err(|e| AppError::NotFound(e.into()))?;

    Ok(match result {
        Ok(payload) => (StatusCode::OK, Json(payload)).into_response(),
        Err(fault) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: fault.message,
            }),
        )
            .into_response(),
    })
}
