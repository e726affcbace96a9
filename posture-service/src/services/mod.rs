pub mod audit;
mod database;
mod memory_store;
pub mod metrics;
mod mongo_store;

pub use audit::{AuditEntry, AuditLogger, MemoryAuditLogger, MongoAuditLogger, TracingAuditLogger};
pub use database::MongoDb;
pub use memory_store::{MemoryState, MemoryStore, ReadFault};
pub use metrics::{get_metrics, init_metrics};
pub use mongo_store::MongoStore;
