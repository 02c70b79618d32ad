//! Runtime orchestration for the decision bridge.
//!
//! This crate owns every piece of shared state between the game engine and the
//! agent: per-game contexts with their decision slot, game log, and snapshot,
//! the registry that hands them out, and the ingest worker that applies
//! engine notifications. Consumers embed [`Runtime`] and talk to it through
//! [`BridgeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the handle, the engine session boundary, and errors
//! - [`context`] holds per-game state and the blocking wait operations
//! - [`events`] defines the notifications the engine pushes
//! - [`oracle`] looks up card rules outside the current game
//! - [`workers`] keeps background tasks internal to the crate
pub mod api;
pub mod config;
pub mod context;
pub mod events;
pub mod oracle;
pub mod registry;
pub mod runtime;
pub mod slot;
pub mod store;

mod workers;

pub use api::{
    BridgeError, BridgeHandle, ChannelSession, CurrentDecision, EngineSession, Outbound, Result,
    SessionError,
};
pub use config::{BridgeConfig, BridgeMode, Timeouts};
pub use context::{
    AnswerReport, ContextStatus, DefaultResolution, DrainReport, GameContext, LogTail,
    ManualChoice, PassReport, PendingSummary, Stored, WaitReport,
};
pub use events::{ChatKind, EngineEvent};
pub use oracle::{CardLookup, CardOracle, CardRules, LookupSource, OracleError, StaticCardOracle};
pub use registry::ContextRegistry;
pub use runtime::{Runtime, RuntimeBuilder};
pub use store::{LogBuffer, SnapshotStore};
