pub mod health;
pub mod mutations;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use mutations::run_mutation;
