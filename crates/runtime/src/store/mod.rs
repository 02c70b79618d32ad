//! Append/replace-only per-context stores.
//!
//! Readers tolerate staleness, so both stores use a read-write lock rather
//! than the per-context mutex guarding the decision slot.
mod log;
mod snapshot;

pub use log::LogBuffer;
pub use snapshot::SnapshotStore;
