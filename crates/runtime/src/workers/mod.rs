//! Worker tasks that back the runtime orchestration.
//!
//! The ingest worker is the single producer for every game context.

mod ingest;

pub use ingest::IngestWorker;
