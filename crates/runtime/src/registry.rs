//! Registry of live game contexts.
//!
//! Contexts are owned here and handed out as `Arc`s; nothing is reachable
//! through ambient statics. The most recently started game is the "current"
//! context the agent-facing handle talks to.
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use decision_core::ContextId;
use tracing::info;

use crate::api::{BridgeError, EngineSession, Result};
use crate::context::GameContext;

#[derive(Default)]
struct Contexts {
    by_id: HashMap<ContextId, Arc<GameContext>>,
    current: Option<ContextId>,
}

pub struct ContextRegistry {
    contexts: Mutex<Contexts>,
    started: Condvar,
    session: Arc<dyn EngineSession>,
}

impl ContextRegistry {
    pub fn new(session: Arc<dyn EngineSession>) -> Self {
        Self {
            contexts: Mutex::new(Contexts::default()),
            started: Condvar::new(),
            session,
        }
    }

    /// Returns the context, registering it on first sight.
    pub fn get_or_create(&self, id: ContextId) -> Result<Arc<GameContext>> {
        let mut contexts = self.lock()?;
        let session = &self.session;
        let context = contexts
            .by_id
            .entry(id)
            .or_insert_with(|| {
                info!(context = %id, "context registered");
                Arc::new(GameContext::new(id, session.clone()))
            })
            .clone();
        if contexts.current.is_none() {
            contexts.current = Some(id);
            self.started.notify_all();
        }
        Ok(context)
    }

    /// Makes `id` the context agent operations address.
    ///
    /// Ended games other than `id` are dropped here; the previous current
    /// game stayed readable until now so waiters could observe its end.
    pub fn set_current(&self, id: ContextId) -> Result<Arc<GameContext>> {
        let context = self.get_or_create(id)?;
        let mut contexts = self.lock()?;
        if contexts.current != Some(id) {
            info!(context = %id, "context is now current");
            contexts.current = Some(id);
        }
        contexts.by_id.retain(|other, ctx| {
            let keep = *other == id || !ctx.is_ended();
            if !keep {
                info!(context = %other, "context dropped");
            }
            keep
        });
        self.started.notify_all();
        Ok(context)
    }

    pub fn current(&self) -> Result<Arc<GameContext>> {
        let contexts = self.lock()?;
        contexts
            .current
            .and_then(|id| contexts.by_id.get(&id).cloned())
            .ok_or(BridgeError::NoActiveContext)
    }

    /// Waits up to `timeout` for a current context to exist.
    pub fn wait_current(&self, timeout: Duration) -> Result<Arc<GameContext>> {
        let deadline = Instant::now() + timeout;
        let mut contexts = self.lock()?;
        loop {
            if let Some(context) = contexts.current.and_then(|id| contexts.by_id.get(&id)) {
                return Ok(context.clone());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(BridgeError::NoActiveContext);
            }
            contexts = self
                .started
                .wait_timeout(contexts, deadline - now)
                .map_err(|_| BridgeError::LockPoisoned { what: "registry" })?
                .0;
        }
    }

    /// Disposes of an ended game.
    ///
    /// A context that is not current goes at once. The current one is kept
    /// until another game becomes current.
    pub fn retire(&self, id: ContextId) -> Result<()> {
        let mut contexts = self.lock()?;
        if contexts.current != Some(id) && contexts.by_id.remove(&id).is_some() {
            info!(context = %id, "context dropped");
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|c| c.by_id.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Contexts>> {
        self.contexts
            .lock()
            .map_err(|_| BridgeError::LockPoisoned { what: "registry" })
    }
}
