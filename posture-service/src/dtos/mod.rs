use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /mutations/:operation`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MutationInput {
    /// Global id of the record the mutation acts on
    #[validate(length(min = 1, message = "target id is required"))]
    pub target: String,
    /// Global id of the organization, for mutations that remove an edge
    #[serde(default)]
    pub organization: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
