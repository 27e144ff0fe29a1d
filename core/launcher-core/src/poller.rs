//! Readiness poller.
//!
//! A dedicated thread that checks the background process readiness flag at a
//! fixed interval and, the first time it reads true, posts exactly one
//! handoff task onto the UI scheduler and exits. The wait between polls is a
//! blocking park, never a spin, and no lock is held across it.
//!
//! Nothing in the launcher interrupts a running poller. [`PollerHandle::interrupt`]
//! exists for hosts tearing the app down; an interrupted poller aborts the
//! startup sequence instead of retrying.

use crate::error::{LauncherError, Result};
use crate::lifecycle::LifecycleProbe;
use crate::scheduler::UiHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, Thread};
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(30);

const POLLER_THREAD_NAME: &str = "readiness-poller";

#[derive(Debug)]
pub struct PollerHandle {
    interrupted: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    thread: Thread,
    join: Option<JoinHandle<()>>,
}

impl PollerHandle {
    /// Interrupts the wait. The poller posts `on_abort` with
    /// [`LauncherError::PollerInterrupted`] and exits.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Release);
        self.thread.unpark();
    }

    /// True once the poller has stopped waiting and is about to hand off or
    /// abort.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn join(mut self) {
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawns the poller thread.
///
/// `on_ready` runs on the UI scheduler after readiness is observed; `on_abort`
/// runs there instead if the poller is interrupted. Exactly one of the two is
/// posted.
pub fn spawn_readiness_poller<R, A>(
    probe: Arc<dyn LifecycleProbe>,
    interval: Duration,
    ui: UiHandle,
    on_ready: R,
    on_abort: A,
) -> Result<PollerHandle>
where
    R: FnOnce() + Send + 'static,
    A: FnOnce(LauncherError) + Send + 'static,
{
    let interrupted = Arc::new(AtomicBool::new(false));
    let finished = Arc::new(AtomicBool::new(false));
    let thread_interrupted = Arc::clone(&interrupted);
    let thread_finished = Arc::clone(&finished);

    let join = thread::Builder::new()
        .name(POLLER_THREAD_NAME.to_string())
        .spawn(move || {
            let mut polls: u64 = 0;
            while !probe.is_ready() {
                polls += 1;
                thread::park_timeout(interval);
                if thread_interrupted.load(Ordering::Acquire) {
                    tracing::error!(polls, "Readiness poller interrupted; aborting startup");
                    thread_finished.store(true, Ordering::Release);
                    if ui
                        .post(move || on_abort(LauncherError::PollerInterrupted))
                        .is_err()
                    {
                        tracing::error!("UI scheduler gone; abort could not be delivered");
                    }
                    return;
                }
            }

            tracing::debug!(polls, "Background process ready");
            // Set before the handoff so the handoff task never sees a live poller.
            thread_finished.store(true, Ordering::Release);
            if let Err(err) = ui.post(on_ready) {
                tracing::error!(error = %err, "Failed to hand off readiness to UI scheduler");
            }
        })
        .map_err(|source| LauncherError::PollerSpawnFailed { source })?;

    Ok(PollerHandle {
        interrupted,
        finished,
        thread: join.thread().clone(),
        join: Some(join),
    })
}
