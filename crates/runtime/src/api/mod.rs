//! Public runtime API surface.
//!
//! Gathers the types consumers of the runtime interact with: the agent-side
//! handle, the engine session boundary, and the error vocabulary.

pub mod errors;
pub mod handle;
pub mod session;

pub use errors::{BridgeError, CurrentDecision, Result, SessionError};
pub use handle::BridgeHandle;
pub use session::{ChannelSession, EngineSession, Outbound};
