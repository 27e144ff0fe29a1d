//! Background-process lifecycle state.
//!
//! The background process owns two process-wide flags: "ready" (initialization
//! finished, its APIs are safe to call) and "manager instantiated" (the
//! in-process manager singleton exists). The launcher and the stale-state guard
//! only ever read them, through [`LifecycleProbe`], so a host can inject its
//! own implementation or share one [`ProcessLifecycle`] between both.

use std::sync::atomic::{AtomicBool, Ordering};

/// Read-only view of the background process lifecycle.
///
/// Both queries must be cheap and non-blocking; the readiness poller calls
/// `is_ready` every poll interval.
pub trait LifecycleProbe: Send + Sync {
    fn is_ready(&self) -> bool;
    fn is_manager_instantiated(&self) -> bool;
}

/// Shared lifecycle flags, written by the background process.
///
/// Once ready, the flag stays set until [`ProcessLifecycle::teardown`]; there is
/// no way to flip it back to false from a running process.
#[derive(Debug, Default)]
pub struct ProcessLifecycle {
    ready: AtomicBool,
    manager_instantiated: AtomicBool,
}

impl ProcessLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        if !self.ready.swap(true, Ordering::AcqRel) {
            tracing::debug!("Background process marked ready");
        }
    }

    pub fn mark_manager_instantiated(&self) {
        self.manager_instantiated.store(true, Ordering::Release);
    }

    /// Clears both flags. Models the hosting process being killed.
    pub fn teardown(&self) {
        self.ready.store(false, Ordering::Release);
        self.manager_instantiated.store(false, Ordering::Release);
        tracing::debug!("Background process torn down");
    }
}

impl LifecycleProbe for ProcessLifecycle {
    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    fn is_manager_instantiated(&self) -> bool {
        self.manager_instantiated.load(Ordering::Acquire)
    }
}
