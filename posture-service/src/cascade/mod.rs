//! Transactional cascade mutations.
//!
//! Every invocation runs the same pipeline: decode the target id, load the
//! actor, let the mutation authorize and resolve its dependency closure, plan
//! the ordered deletes, execute them in one transaction and report exactly
//! one audit line.

pub mod context;
pub mod engine;
pub mod executor;
pub mod gate;
pub mod global_id;
pub mod kind;
pub mod outcome;
pub mod planner;
pub mod reporter;
pub mod resolver;
pub mod store;

pub use context::RequestContext;
pub use engine::{CascadeEngine, CascadeSettings};
pub use global_id::{GlobalId, GlobalIdError, TargetIds};
pub use kind::{CascadeKind, UnknownOperation};
pub use outcome::{CascadeFault, MutationPayload, UserError};
pub use store::{ArtifactCounts, CascadeStore, CascadeTransaction, StoreError, WriteOp};
