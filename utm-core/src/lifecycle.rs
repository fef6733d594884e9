//! Request lifecycle hooks
//!
//! The hosting pipeline owns a [`RequestLifecycle`] and calls
//! [`RequestLifecycle::dispatch`] once per inbound request, right after it has
//! built the request's [`AttributionStore`]. Which hooks run is decided when
//! the lifecycle is built, so the engine never needs to know how the host
//! wires its middleware.

use std::sync::Arc;

use crate::config::UtmConfig;
use crate::error::UtmResult;
use crate::store::AttributionStore;

/// Whether a request came from the client or was issued internally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Top-level request from the client
    Main,
    /// Internal request dispatched while handling a main request
    Sub,
}

impl RequestKind {
    pub fn is_main(&self) -> bool {
        matches!(self, RequestKind::Main)
    }
}

/// Callback run for every inbound request
pub trait RequestHook: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    fn on_request(&self, kind: RequestKind, store: &mut AttributionStore) -> UtmResult<()>;
}

/// Initializes attribution on main requests
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoInitHook;

impl RequestHook for AutoInitHook {
    fn name(&self) -> &str {
        "auto_init"
    }

    fn on_request(&self, kind: RequestKind, store: &mut AttributionStore) -> UtmResult<()> {
        if !kind.is_main() {
            return Ok(());
        }
        store.init();
        Ok(())
    }
}

/// Ordered set of hooks run for each request
#[derive(Clone, Default)]
pub struct RequestLifecycle {
    hooks: Vec<Arc<dyn RequestHook>>,
}

impl RequestLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifecycle for `config`: [`AutoInitHook`] is registered only when
    /// `auto_init` is enabled.
    pub fn from_config(config: &UtmConfig) -> Self {
        let mut lifecycle = Self::new();
        if config.auto_init {
            lifecycle.register(AutoInitHook);
        }
        lifecycle
    }

    pub fn register(&mut self, hook: impl RequestHook + 'static) {
        self.hooks.push(Arc::new(hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook in registration order. Stops at the first error.
    pub fn dispatch(&self, kind: RequestKind, store: &mut AttributionStore) -> UtmResult<()> {
        for hook in &self.hooks {
            tracing::trace!(hook = hook.name(), ?kind, "running request hook");
            hook.on_request(kind, store)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for RequestLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.hooks.iter().map(|hook| hook.name()).collect();
        f.debug_struct("RequestLifecycle")
            .field("hooks", &names)
            .finish()
    }
}
