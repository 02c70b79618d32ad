//! High-level runtime orchestrator.
//!
//! The runtime owns the context registry and the ingest worker, wires the
//! ingest channel, and exposes a builder-based API for the server.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::api::{BridgeError, BridgeHandle, EngineSession, Result};
use crate::config::BridgeConfig;
use crate::events::EngineEvent;
use crate::oracle::{CardOracle, StaticCardOracle};
use crate::registry::ContextRegistry;
use crate::workers::IngestWorker;

/// Main runtime that owns the bridge state.
///
/// [`BridgeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: BridgeHandle,
    ingest_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    pub fn handle(&self) -> BridgeHandle {
        self.handle.clone()
    }

    /// Sender half of the ingest channel.
    pub fn events(&self) -> mpsc::Sender<EngineEvent> {
        self.handle.events()
    }

    /// Waits for the ingest worker to drain.
    ///
    /// The worker stops once every handle and event sender is dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);
        self.ingest_worker_handle
            .await
            .map_err(BridgeError::WorkerJoin)?;
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: BridgeConfig,
    session: Option<Arc<dyn EngineSession>>,
    oracle: Option<Arc<dyn CardOracle>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: BridgeConfig::default(),
            session: None,
            oracle: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the required engine session
    pub fn session(mut self, session: impl EngineSession + 'static) -> Self {
        self.session = Some(Arc::new(session));
        self
    }

    /// Set the card oracle (optional, defaults to an empty table)
    pub fn oracle(mut self, oracle: impl CardOracle + 'static) -> Self {
        self.oracle = Some(Arc::new(oracle));
        self
    }

    /// Build the runtime and spawn the ingest worker
    pub async fn build(self) -> Result<Runtime> {
        let session = self.session.ok_or(BridgeError::MissingSession)?;
        let oracle = self
            .oracle
            .unwrap_or_else(|| Arc::new(StaticCardOracle::new()));

        let registry = Arc::new(ContextRegistry::new(session));
        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>(self.config.event_buffer.max(1));

        let handle = BridgeHandle::new(
            registry.clone(),
            oracle,
            self.config.timeouts.clone(),
            event_tx,
        );

        info!(mode = %self.config.mode, auto_pay_mana = self.config.auto_pay_mana, "bridge runtime starting");
        let worker = IngestWorker::new(registry, self.config, event_rx);
        let ingest_worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            ingest_worker_handle,
        })
    }
}
