//! The launcher: entry point of every cold start.
//!
//! ```text
//! on_create(request)
//!    │  classify ─▶ ResolvedTarget
//!    ├─ process ready ──────────────────────────────┐
//!    └─ not ready: start service, spawn poller ─────┤ (handoff on UI scheduler)
//!                                                   ▼
//!                               post_delayed(settle_delay, dispatch)
//!                                                   ▼
//!                                        Dispatcher::dispatch ─▶ navigate
//! ```
//!
//! `on_create` must be called on the thread driving the [`UiScheduler`]
//! (crate::scheduler::UiScheduler); the dispatch always runs there too.

use crate::classifier::{classify, ResolvedTarget};
use crate::collaborators::Collaborators;
use crate::config::LauncherConfig;
use crate::dispatcher::{DispatchReport, Dispatcher};
use crate::error::{LauncherError, Result};
use crate::guard::StaleStateGuard;
use crate::poller::{spawn_readiness_poller, PollerHandle};
use crate::request::StartupRequest;
use crate::scheduler::UiHandle;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// Startup Sequence
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceState {
    WaitingForReadiness,
    /// Readiness confirmed; dispatch is scheduled after the settling delay.
    Settling,
    Dispatched(Box<DispatchReport>),
    Aborted { reason: String },
}

#[derive(Debug)]
struct SequenceInner {
    state: SequenceState,
    waited_for_readiness: bool,
}

/// Handle on one startup sequence, shared with the tasks that drive it.
#[derive(Debug, Clone)]
pub struct StartupSequence {
    inner: Arc<Mutex<SequenceInner>>,
}

impl StartupSequence {
    fn new(waited_for_readiness: bool) -> Self {
        let state = if waited_for_readiness {
            SequenceState::WaitingForReadiness
        } else {
            SequenceState::Settling
        };
        Self {
            inner: Arc::new(Mutex::new(SequenceInner {
                state,
                waited_for_readiness,
            })),
        }
    }

    pub fn state(&self) -> SequenceState {
        self.inner
            .lock()
            .map(|inner| inner.state.clone())
            .unwrap_or(SequenceState::Aborted {
                reason: "sequence state poisoned".to_string(),
            })
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.state(),
            SequenceState::Dispatched(_) | SequenceState::Aborted { .. }
        )
    }

    pub fn report(&self) -> Option<DispatchReport> {
        match self.state() {
            SequenceState::Dispatched(report) => Some(*report),
            _ => None,
        }
    }

    /// True when the background process was not ready at launch and a poller
    /// had to wait for it.
    pub fn waited_for_readiness(&self) -> bool {
        self.inner
            .lock()
            .map(|inner| inner.waited_for_readiness)
            .unwrap_or(false)
    }

    fn set_state(&self, state: SequenceState) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.state = state;
        }
    }

    fn abort(&self, err: &LauncherError) {
        tracing::error!(error = %err, "Startup sequence aborted");
        self.set_state(SequenceState::Aborted {
            reason: err.to_string(),
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Launcher
// ═══════════════════════════════════════════════════════════════════════════════

pub struct Launcher {
    config: LauncherConfig,
    collaborators: Collaborators,
    dispatcher: Arc<Dispatcher>,
    ui: UiHandle,
    poller: Mutex<Option<PollerHandle>>,
    pollers_spawned: AtomicUsize,
}

impl Launcher {
    pub fn new(config: LauncherConfig, collaborators: Collaborators, ui: UiHandle) -> Self {
        let dispatcher = Arc::new(Dispatcher::new(config.clone(), collaborators.clone()));
        Self {
            config,
            collaborators,
            dispatcher,
            ui,
            poller: Mutex::new(None),
            pollers_spawned: AtomicUsize::new(0),
        }
    }

    /// Starts a startup sequence for `request`.
    ///
    /// If the background process is already ready the dispatch is scheduled
    /// right away. Otherwise the background service is started and a
    /// readiness poller is spawned; at most one poller is outstanding per
    /// launcher, and a second call while one is waiting fails with
    /// [`LauncherError::PollerOutstanding`].
    pub fn on_create(&self, request: StartupRequest) -> Result<StartupSequence> {
        let mut poller_slot = self
            .poller
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(poller) = poller_slot.take() {
            if !poller.is_finished() {
                tracing::warn!("Startup sequence requested while a poller is outstanding");
                *poller_slot = Some(poller);
                return Err(LauncherError::PollerOutstanding);
            }
            poller.join();
        }

        if self.config.display.orientation_portrait_only {
            self.collaborators.navigator.lock_portrait_orientation();
        }

        let intent = classify(&request);
        let process_ready = self.collaborators.lifecycle.is_ready();
        tracing::debug!(
            action = ?request.action,
            intent = ?intent,
            process_ready,
            "Startup request classified"
        );
        let target = ResolvedTarget::from_intent(
            intent,
            process_ready,
            self.collaborators.contacts.as_ref(),
        );

        if process_ready {
            let sequence = StartupSequence::new(false);
            schedule_dispatch(
                &self.ui,
                Arc::clone(&self.dispatcher),
                self.config.settle_delay(),
                request,
                target,
                sequence.clone(),
            )?;
            return Ok(sequence);
        }

        let sequence = StartupSequence::new(true);
        self.collaborators.service.start();

        let on_ready = {
            let ui = self.ui.clone();
            let dispatcher = Arc::clone(&self.dispatcher);
            let settle_delay = self.config.settle_delay();
            let sequence = sequence.clone();
            move || {
                let scheduled = schedule_dispatch(
                    &ui,
                    dispatcher,
                    settle_delay,
                    request,
                    target,
                    sequence.clone(),
                );
                if let Err(err) = scheduled {
                    sequence.abort(&err);
                }
            }
        };
        let on_abort = {
            let sequence = sequence.clone();
            move |err: LauncherError| sequence.abort(&err)
        };

        let poller = spawn_readiness_poller(
            Arc::clone(&self.collaborators.lifecycle),
            self.config.poll_interval(),
            self.ui.clone(),
            on_ready,
            on_abort,
        )?;
        self.pollers_spawned.fetch_add(1, Ordering::SeqCst);
        *poller_slot = Some(poller);
        tracing::info!("Waiting for background process readiness");

        Ok(sequence)
    }

    /// Number of readiness pollers this launcher has spawned.
    pub fn pollers_spawned(&self) -> usize {
        self.pollers_spawned.load(Ordering::SeqCst)
    }

    /// Interrupts the outstanding poller, if any. The sequence it serves
    /// aborts; there is no retry.
    pub fn interrupt_poller(&self) -> bool {
        match self.poller.lock() {
            Ok(slot) => match slot.as_ref() {
                Some(poller) if !poller.is_finished() => {
                    poller.interrupt();
                    true
                }
                _ => false,
            },
            Err(_) => false,
        }
    }

    /// A guard wired to the same lifecycle and navigator as this launcher.
    pub fn stale_state_guard(&self) -> StaleStateGuard {
        StaleStateGuard::new(
            Arc::clone(&self.collaborators.lifecycle),
            Arc::clone(&self.collaborators.navigator),
        )
    }
}

fn schedule_dispatch(
    ui: &UiHandle,
    dispatcher: Arc<Dispatcher>,
    settle_delay: Duration,
    request: StartupRequest,
    mut target: ResolvedTarget,
    sequence: StartupSequence,
) -> Result<()> {
    sequence.set_state(SequenceState::Settling);
    ui.post_delayed(settle_delay, move || {
        let report = dispatcher.dispatch(&request, &mut target);
        sequence.set_state(SequenceState::Dispatched(Box::new(report)));
    })
}
