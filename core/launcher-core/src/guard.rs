//! Stale-state guard.
//!
//! The platform may recreate a screen after the hosting process was killed
//! and restarted, leaving UI state without the background process or its
//! manager behind it. Screens that depend on either call
//! [`StaleStateGuard::on_create`] first; if anything is missing the screen is
//! abandoned and the launcher re-entered with the original request, so the
//! full readiness wait runs again.

use crate::lifecycle::LifecycleProbe;
use crate::navigation::Navigator;
use crate::request::StartupRequest;
use crate::screens::Screen;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum GuardDecision {
    /// Dependencies are live; the screen may proceed.
    Proceed,
    /// Dependencies are gone; the screen must restart the launcher.
    Restart,
}

/// Pure guard decision, exported for hosts that navigate themselves.
#[uniffi::export]
pub fn evaluate_stale_state(process_ready: bool, manager_instantiated: bool) -> GuardDecision {
    if process_ready && manager_instantiated {
        GuardDecision::Proceed
    } else {
        GuardDecision::Restart
    }
}

pub struct StaleStateGuard {
    lifecycle: Arc<dyn LifecycleProbe>,
    navigator: Arc<dyn Navigator>,
}

impl StaleStateGuard {
    pub fn new(lifecycle: Arc<dyn LifecycleProbe>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            lifecycle,
            navigator,
        }
    }

    /// Checks dependencies for `screen`, which was created by `request`.
    ///
    /// On [`GuardDecision::Restart`] the screen has already been finished and
    /// the launcher restarted; the caller must not continue rendering.
    pub fn on_create(&self, screen: Screen, request: &StartupRequest) -> GuardDecision {
        let process_ready = self.lifecycle.is_ready();
        let manager_instantiated = self.lifecycle.is_manager_instantiated();
        let decision = evaluate_stale_state(process_ready, manager_instantiated);

        if decision == GuardDecision::Restart {
            tracing::warn!(
                screen = ?screen,
                process_ready,
                manager_instantiated,
                "Stale screen detected; restarting launcher"
            );
            self.navigator.finish(screen);
            self.navigator.restart_launcher(request.clone());
        }

        decision
    }
}
