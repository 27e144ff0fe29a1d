//! launcher: drives one cold-start sequence against simulated collaborators.
//!
//! ## Subcommands
//!
//! - `run`: Full startup sequence; host side effects are printed as JSON lines
//! - `classify`: Classify a startup request without running anything
//! - `guard`: Evaluate the stale-state guard for given lifecycle flags

mod error;
mod harness;
mod logging;

use clap::{Parser, Subcommand, ValueEnum};
use error::CliError;
use harness::{build_collaborators, CliEvent, EventSink, Fixtures, HarnessOptions};
use launcher_core::{
    classify, evaluate_stale_state, load_launcher_config, GuardDecision, Launcher,
    ProcessLifecycle, Screen, SequenceState, StartupRequest, UiScheduler,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Grace period for an interrupted poller to post its abort.
const ABORT_GRACE: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "launcher")]
#[command(about = "Softphone cold-start launcher driver")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a startup sequence for a request (JSON file, or `-` for stdin)
    Run {
        #[arg(value_name = "REQUEST")]
        request: PathBuf,

        /// Launcher config (defaults to ~/.linphone/launcher.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Contact and file lookup tables
        #[arg(long)]
        fixtures: Option<PathBuf>,

        /// Background process is already ready when the launcher starts
        #[arg(long)]
        ready_at_launch: bool,

        /// Milliseconds after service start until the process becomes ready
        #[arg(long, value_name = "MS")]
        ready_after_ms: Option<u64>,

        /// Treat this run as the first one after remote provisioning
        #[arg(long)]
        first_remote_provisioning: bool,

        /// Screens already alive in the process
        #[arg(long = "live-screen", value_enum)]
        live_screens: Vec<LiveScreen>,

        /// Give up (interrupting the poller) after this many milliseconds
        #[arg(long, value_name = "MS", default_value_t = 10_000)]
        timeout_ms: u64,
    },

    /// Print the classification of a request
    Classify {
        #[arg(value_name = "REQUEST")]
        request: PathBuf,
    },

    /// Print the stale-state guard decision
    Guard {
        #[arg(long)]
        process_ready: bool,

        #[arg(long)]
        manager_instantiated: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LiveScreen {
    Main,
    Call,
}

impl From<LiveScreen> for Screen {
    fn from(screen: LiveScreen) -> Self {
        match screen {
            LiveScreen::Main => Screen::Main,
            LiveScreen::Call => Screen::Call,
        }
    }
}

struct RunArgs {
    request: PathBuf,
    config: Option<PathBuf>,
    fixtures: Option<PathBuf>,
    ready_at_launch: bool,
    ready_after: Option<Duration>,
    first_remote_provisioning: bool,
    live_screens: Vec<Screen>,
    timeout_ms: u64,
}

fn main() {
    let _logging_guard = logging::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            request,
            config,
            fixtures,
            ready_at_launch,
            ready_after_ms,
            first_remote_provisioning,
            live_screens,
            timeout_ms,
        } => run(RunArgs {
            request,
            config,
            fixtures,
            ready_at_launch,
            ready_after: ready_after_ms.map(Duration::from_millis),
            first_remote_provisioning,
            live_screens: live_screens.into_iter().map(Screen::from).collect(),
            timeout_ms,
        }),
        Commands::Classify { request } => classify_request(&request),
        Commands::Guard {
            process_ready,
            manager_instantiated,
        } => {
            let decision = match evaluate_stale_state(process_ready, manager_instantiated) {
                GuardDecision::Proceed => "proceed",
                GuardDecision::Restart => "restart",
            };
            println!("{}", serde_json::json!({ "decision": decision }));
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "launcher failed");
        eprintln!("launcher: {e}");
        std::process::exit(1);
    }
}

fn read_request(path: &Path) -> Result<StartupRequest, CliError> {
    let json = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|source| CliError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        buffer
    } else {
        fs_err::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?
    };
    Ok(StartupRequest::from_json(&json)?)
}

fn classify_request(path: &Path) -> Result<(), CliError> {
    let request = read_request(path)?;
    let intent = classify(&request);
    match serde_json::to_string(&intent) {
        Ok(line) => println!("{line}"),
        Err(err) => tracing::warn!(error = %err, "Failed to serialize intent"),
    }
    Ok(())
}

fn run(args: RunArgs) -> Result<(), CliError> {
    let config = load_launcher_config(args.config)?;
    let request = read_request(&args.request)?;
    let fixtures = Fixtures::load(args.fixtures.as_deref())?;

    let lifecycle = Arc::new(ProcessLifecycle::new());
    if args.ready_at_launch {
        lifecycle.mark_manager_instantiated();
        lifecycle.mark_ready();
    }

    let sink = Arc::new(EventSink::default());
    let collaborators = build_collaborators(
        HarnessOptions {
            fixtures,
            ready_after: args.ready_after,
            first_remote_provisioning: args.first_remote_provisioning,
            live_screens: args.live_screens,
        },
        lifecycle,
        Arc::clone(&sink),
    );

    let mut scheduler = UiScheduler::new();
    let launcher = Launcher::new(config, collaborators, scheduler.handle());
    let sequence = launcher.on_create(request)?;

    let deadline = Instant::now() + Duration::from_millis(args.timeout_ms);
    if !scheduler.run_until(|| sequence.is_finished(), Some(deadline)) {
        tracing::warn!(timeout_ms = args.timeout_ms, "Startup sequence timed out");
        if launcher.interrupt_poller() {
            scheduler.run_until(|| sequence.is_finished(), Some(Instant::now() + ABORT_GRACE));
        }
    }

    match sequence.state() {
        SequenceState::Dispatched(report) => {
            sink.emit(CliEvent::Dispatched { report: *report });
            Ok(())
        }
        SequenceState::Aborted { reason } => {
            sink.emit(CliEvent::Aborted {
                reason: reason.clone(),
            });
            Err(CliError::Aborted { reason })
        }
        SequenceState::WaitingForReadiness | SequenceState::Settling => Err(CliError::TimedOut {
            timeout_ms: args.timeout_ms,
        }),
    }
}
