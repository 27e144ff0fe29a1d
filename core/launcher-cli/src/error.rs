use launcher_core::LauncherError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fixtures in {path}: {source}")]
    Fixtures {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Launcher(#[from] LauncherError),

    #[error("Startup sequence aborted: {reason}")]
    Aborted { reason: String },

    #[error("Startup sequence did not finish within {timeout_ms} ms")]
    TimedOut { timeout_ms: u64 },
}
