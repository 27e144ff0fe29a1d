//! # launcher-core
//!
//! Cold-start orchestration for the Linphone client: classifies the request
//! that opened the app, waits for the background telephony process to become
//! ready, and hands off to the right first screen.
//!
//! ## Design Principles
//!
//! - **Host-owned side effects**: Contacts, files, calls, service start and
//!   navigation are traits implemented by the host; this crate only decides.
//! - **One UI thread**: Everything that touches navigation runs as a task on
//!   [`UiScheduler`]; only the readiness poller lives on its own thread.
//! - **Single delivery**: A resolved call target is consumed by exactly one
//!   dispatch.
//! - **FFI-ready**: UniFFI annotations expose the pure decisions (classifier,
//!   destination selection, stale-state guard) to Kotlin and Swift hosts.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use launcher_core::{load_launcher_config, Launcher, StartupRequest, UiScheduler};
//!
//! let mut scheduler = UiScheduler::new();
//! let launcher = Launcher::new(load_launcher_config(None)?, collaborators, scheduler.handle());
//! let sequence = launcher.on_create(StartupRequest::from_json(&payload)?)?;
//! scheduler.run_until(|| sequence.is_finished(), None);
//! ```

// UniFFI scaffolding for Kotlin/Swift bindings
uniffi::setup_scaffolding!();

pub mod classifier;
pub mod collaborators;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod guard;
pub mod launcher;
pub mod lifecycle;
pub mod navigation;
pub mod poller;
pub mod request;
pub mod scheduler;
pub mod screens;

pub use classifier::{classify, decode_call_address, ResolvedTarget, StartupIntent};
pub use collaborators::{
    BackgroundService, CallManager, Collaborators, ContactResolver, FilePathResolver,
    ProvisioningPreferences,
};
pub use config::*;
pub use dispatcher::{
    select_destination, CallSignalOutcome, DispatchReport, Dispatcher, PendingShare,
};
pub use error::{LauncherError, LauncherFfiError, Result};
pub use guard::{evaluate_stale_state, GuardDecision, StaleStateGuard};
pub use launcher::{Launcher, SequenceState, StartupSequence};
pub use lifecycle::{LifecycleProbe, ProcessLifecycle};
pub use navigation::{Navigator, OutgoingRequest};
pub use poller::{spawn_readiness_poller, PollerHandle, DEFAULT_POLL_INTERVAL};
pub use request::*;
pub use scheduler::{UiHandle, UiScheduler};
pub use screens::{Screen, ScreenEvent, ScreenHandler, ScreenRegistry};
