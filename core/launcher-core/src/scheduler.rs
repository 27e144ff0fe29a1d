//! UI-bound cooperative scheduler.
//!
//! All screen creation, navigation and dispatch happen on one thread: the one
//! driving [`UiScheduler::run_until`]. Other threads (the readiness poller)
//! only hand work over through a [`UiHandle`]. Tasks run one at a time, in due
//! order, so nothing posted here needs its own synchronization against other
//! posted tasks.

use crate::error::{LauncherError, Result};
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub type UiTask = Box<dyn FnOnce() + Send + 'static>;

struct ScheduledTask {
    due: Instant,
    seq: u64,
    task: UiTask,
}

// BinaryHeap is a max-heap; invert so the earliest (then first-posted) task
// sits on top.
impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledTask {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for ScheduledTask {}

/// Cloneable, `Send` handle for posting work onto the UI scheduler.
#[derive(Clone)]
pub struct UiHandle {
    sender: Sender<ScheduledTask>,
    next_seq: Arc<AtomicU64>,
}

impl UiHandle {
    /// Runs `task` on the UI thread as soon as possible.
    pub fn post(&self, task: impl FnOnce() + Send + 'static) -> Result<()> {
        self.post_delayed(Duration::ZERO, task)
    }

    /// Runs `task` on the UI thread once `delay` has elapsed.
    pub fn post_delayed(
        &self,
        delay: Duration,
        task: impl FnOnce() + Send + 'static,
    ) -> Result<()> {
        let scheduled = ScheduledTask {
            due: Instant::now() + delay,
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            task: Box::new(task),
        };
        self.sender
            .send(scheduled)
            .map_err(|_| LauncherError::SchedulerClosed)
    }
}

impl std::fmt::Debug for UiHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiHandle").finish_non_exhaustive()
    }
}

pub struct UiScheduler {
    receiver: Receiver<ScheduledTask>,
    timers: BinaryHeap<ScheduledTask>,
    handle: UiHandle,
}

impl UiScheduler {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            receiver,
            timers: BinaryHeap::new(),
            handle: UiHandle {
                sender,
                next_seq: Arc::new(AtomicU64::new(0)),
            },
        }
    }

    pub fn handle(&self) -> UiHandle {
        self.handle.clone()
    }

    /// Number of tasks waiting to run, including delayed ones.
    pub fn pending(&mut self) -> usize {
        self.drain_channel();
        self.timers.len()
    }

    /// Drives posted tasks on the calling thread until `done` returns true.
    ///
    /// `done` is checked after every batch of due tasks. Between batches the
    /// thread blocks until the next timer is due or a new task is posted, so
    /// an idle scheduler costs nothing. With no deadline this waits forever,
    /// which is the intended behavior while the background process is not
    /// ready. Returns false if `deadline` passed before `done` held.
    pub fn run_until(&mut self, mut done: impl FnMut() -> bool, deadline: Option<Instant>) -> bool {
        loop {
            self.run_due_tasks();
            if done() {
                return true;
            }

            let now = Instant::now();
            if deadline.is_some_and(|deadline| now >= deadline) {
                return false;
            }

            let next_timer = self.timers.peek().map(|scheduled| scheduled.due);
            let wake_at = match (next_timer, deadline) {
                (Some(timer), Some(deadline)) => Some(timer.min(deadline)),
                (timer, deadline) => timer.or(deadline),
            };

            let received = match wake_at {
                Some(wake_at) => match self
                    .receiver
                    .recv_timeout(wake_at.saturating_duration_since(now))
                {
                    Ok(scheduled) => Some(scheduled),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => return done(),
                },
                None => match self.receiver.recv() {
                    Ok(scheduled) => Some(scheduled),
                    Err(_) => return done(),
                },
            };

            if let Some(scheduled) = received {
                self.timers.push(scheduled);
            }
        }
    }

    fn drain_channel(&mut self) {
        while let Ok(scheduled) = self.receiver.try_recv() {
            self.timers.push(scheduled);
        }
    }

    fn run_due_tasks(&mut self) {
        self.drain_channel();
        let now = Instant::now();
        while self
            .timers
            .peek()
            .is_some_and(|scheduled| scheduled.due <= now)
        {
            if let Some(scheduled) = self.timers.pop() {
                (scheduled.task)();
            }
        }
    }
}

impl Default for UiScheduler {
    fn default() -> Self {
        Self::new()
    }
}
