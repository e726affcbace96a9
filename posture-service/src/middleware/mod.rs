pub mod context;

pub use context::ACTOR_HEADER;
