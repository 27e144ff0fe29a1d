//! Error types for launcher-core operations.
//! Keep LauncherFfiError minimal and stable to avoid breaking FFI clients.

use std::path::PathBuf;

// ═══════════════════════════════════════════════════════════════════════════════
// FFI-Compatible Error (for Kotlin/Swift)
// ═══════════════════════════════════════════════════════════════════════════════

/// FFI-safe error type for use across language boundaries.
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum LauncherFfiError {
    #[error("{message}")]
    General { message: String },
}

impl From<String> for LauncherFfiError {
    fn from(message: String) -> Self {
        LauncherFfiError::General { message }
    }
}

impl From<LauncherError> for LauncherFfiError {
    fn from(err: LauncherError) -> Self {
        LauncherFfiError::General {
            message: err.to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Internal Error (for Rust-only use)
// ═══════════════════════════════════════════════════════════════════════════════

/// All errors that can occur while orchestrating a startup sequence.
///
/// Missing or unparseable data references are not errors: the classifier
/// leaves the corresponding field empty instead.
#[derive(Debug, thiserror::Error)]
pub enum LauncherError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Launcher configuration malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Startup request malformed: {details}")]
    RequestMalformed { details: String },

    // ─────────────────────────────────────────────────────────────────────
    // Readiness Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Readiness poller was interrupted while waiting for the background process")]
    PollerInterrupted,

    #[error("Failed to spawn readiness poller: {source}")]
    PollerSpawnFailed {
        #[source]
        source: std::io::Error,
    },

    #[error("A readiness poller is already outstanding for this launcher")]
    PollerOutstanding,

    #[error("UI scheduler is no longer running")]
    SchedulerClosed,
}

/// Convenience type alias for Results using LauncherError.
pub type Result<T> = std::result::Result<T, LauncherError>;

impl From<LauncherError> for String {
    fn from(err: LauncherError) -> String {
        err.to_string()
    }
}
