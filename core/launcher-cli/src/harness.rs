//! Simulated host collaborators.
//!
//! Every side effect the launcher asks the host for is written to stdout as a
//! single JSON line, so a run can be inspected or diffed as a transcript.

use crate::error::CliError;
use launcher_core::{
    BackgroundService, CallManager, Collaborators, ContactResolver, DispatchReport,
    FilePathResolver, Navigator, OutgoingRequest, ProcessLifecycle, ProvisioningPreferences,
    Screen, ScreenEvent, ScreenHandler, ScreenRegistry, StartupRequest,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// Event Stream
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CliEvent {
    ServiceStarted,
    ProcessReady,
    LockPortrait,
    Navigate { request: OutgoingRequest },
    Finish { screen: Screen },
    RestartLauncher { request: StartupRequest },
    OriginateCall { number: String },
    ScreenEvent { screen: Screen, payload: ScreenEvent },
    Dispatched { report: DispatchReport },
    Aborted { reason: String },
}

/// Serializes events to stdout, one JSON object per line.
#[derive(Debug, Default)]
pub struct EventSink {
    lock: Mutex<()>,
}

impl EventSink {
    pub fn emit(&self, event: CliEvent) {
        let line = match serde_json::to_string(&event) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to serialize event");
                return;
            }
        };
        let _guard = self.lock.lock();
        let mut stdout = std::io::stdout().lock();
        if let Err(err) = writeln!(stdout, "{line}").and_then(|_| stdout.flush()) {
            tracing::warn!(error = %err, "Failed to write event");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Fixtures
// ═══════════════════════════════════════════════════════════════════════════════

/// Lookup tables standing in for the contact store and content resolver.
///
/// ```json
/// { "contacts": { "content://contacts/1": "alice@example.org" },
///   "files": { "content://media/7": "/sdcard/photo.jpg" } }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub contacts: HashMap<String, String>,
    #[serde(default)]
    pub files: HashMap<String, String>,
}

impl Fixtures {
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs_err::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| CliError::Fixtures {
            path: path.to_path_buf(),
            source,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Simulated Collaborators
// ═══════════════════════════════════════════════════════════════════════════════

struct TableContacts(HashMap<String, String>);

impl ContactResolver for TableContacts {
    fn resolve_address_or_number(&self, uri: &str) -> Option<String> {
        self.0.get(uri).cloned()
    }
}

struct TableFiles(HashMap<String, String>);

impl FilePathResolver for TableFiles {
    fn resolve_file_path(&self, uri: &str) -> Option<String> {
        self.0.get(uri).cloned()
    }
}

/// Brings the background process up `ready_after` after being started.
/// With no delay configured the process never becomes ready.
struct SimulatedService {
    lifecycle: Arc<ProcessLifecycle>,
    ready_after: Option<Duration>,
    sink: Arc<EventSink>,
}

impl BackgroundService for SimulatedService {
    fn start(&self) {
        self.sink.emit(CliEvent::ServiceStarted);
        let Some(delay) = self.ready_after else {
            tracing::debug!("Simulated service will never become ready");
            return;
        };

        let lifecycle = Arc::clone(&self.lifecycle);
        let sink = Arc::clone(&self.sink);
        let spawned = thread::Builder::new()
            .name("simulated-service".to_string())
            .spawn(move || {
                thread::sleep(delay);
                sink.emit(CliEvent::ProcessReady);
                lifecycle.mark_manager_instantiated();
                lifecycle.mark_ready();
            });
        if let Err(err) = spawned {
            tracing::error!(error = %err, "Failed to start simulated service");
        }
    }
}

struct PrintingCalls(Arc<EventSink>);

impl CallManager for PrintingCalls {
    fn originate_call(&self, number: &str) {
        self.0.emit(CliEvent::OriginateCall {
            number: number.to_string(),
        });
    }
}

struct FixedPreferences(bool);

impl ProvisioningPreferences for FixedPreferences {
    fn is_first_remote_provisioning(&self) -> bool {
        self.0
    }
}

struct PrintingNavigator(Arc<EventSink>);

impl Navigator for PrintingNavigator {
    fn navigate(&self, request: OutgoingRequest) {
        self.0.emit(CliEvent::Navigate { request });
    }

    fn finish(&self, screen: Screen) {
        self.0.emit(CliEvent::Finish { screen });
    }

    fn restart_launcher(&self, request: StartupRequest) {
        self.0.emit(CliEvent::RestartLauncher { request });
    }

    fn lock_portrait_orientation(&self) {
        self.0.emit(CliEvent::LockPortrait);
    }
}

/// A screen that is already alive in the simulated process.
struct PrintingScreen {
    screen: Screen,
    sink: Arc<EventSink>,
}

impl ScreenHandler for PrintingScreen {
    fn handle(&self, event: &ScreenEvent) {
        self.sink.emit(CliEvent::ScreenEvent {
            screen: self.screen,
            payload: event.clone(),
        });
    }
}

pub struct HarnessOptions {
    pub fixtures: Fixtures,
    pub ready_after: Option<Duration>,
    pub first_remote_provisioning: bool,
    pub live_screens: Vec<Screen>,
}

pub fn build_collaborators(
    options: HarnessOptions,
    lifecycle: Arc<ProcessLifecycle>,
    sink: Arc<EventSink>,
) -> Collaborators {
    let screens = Arc::new(ScreenRegistry::new());
    for screen in options.live_screens {
        screens.register(
            screen,
            Arc::new(PrintingScreen {
                screen,
                sink: Arc::clone(&sink),
            }),
        );
    }

    Collaborators {
        lifecycle: lifecycle.clone(),
        service: Arc::new(SimulatedService {
            lifecycle,
            ready_after: options.ready_after,
            sink: Arc::clone(&sink),
        }),
        contacts: Arc::new(TableContacts(options.fixtures.contacts)),
        files: Arc::new(TableFiles(options.fixtures.files)),
        calls: Arc::new(PrintingCalls(Arc::clone(&sink))),
        preferences: Arc::new(FixedPreferences(options.first_remote_provisioning)),
        navigator: Arc::new(PrintingNavigator(sink)),
        screens,
    }
}
