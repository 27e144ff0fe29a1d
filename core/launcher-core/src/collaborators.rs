//! Interfaces to the external collaborators the launcher depends on.
//!
//! None of these are implemented here: the contact lookup, file-path lookup,
//! call origination and service start all live in the host application. Each
//! trait is the narrowest surface the launcher actually calls.

use crate::lifecycle::LifecycleProbe;
use crate::navigation::Navigator;
use crate::screens::ScreenRegistry;
use std::sync::Arc;

/// Maps a platform contact reference to a dialable address or number.
///
/// Depends on contact data owned by the background process, so the launcher
/// only calls it once the process is ready.
pub trait ContactResolver: Send + Sync {
    fn resolve_address_or_number(&self, uri: &str) -> Option<String>;
}

/// Maps a content stream reference to a filesystem path.
pub trait FilePathResolver: Send + Sync {
    fn resolve_file_path(&self, uri: &str) -> Option<String>;
}

/// Originates calls without going through screen navigation.
pub trait CallManager: Send + Sync {
    fn originate_call(&self, number: &str);
}

/// Starts the background process when it is not running yet.
pub trait BackgroundService: Send + Sync {
    fn start(&self);
}

/// Persisted preferences the launcher reads (never writes).
pub trait ProvisioningPreferences: Send + Sync {
    fn is_first_remote_provisioning(&self) -> bool;
}

/// Everything the launcher, dispatcher and guard reach outside themselves.
#[derive(Clone)]
pub struct Collaborators {
    pub lifecycle: Arc<dyn LifecycleProbe>,
    pub service: Arc<dyn BackgroundService>,
    pub contacts: Arc<dyn ContactResolver>,
    pub files: Arc<dyn FilePathResolver>,
    pub calls: Arc<dyn CallManager>,
    pub preferences: Arc<dyn ProvisioningPreferences>,
    pub navigator: Arc<dyn Navigator>,
    pub screens: Arc<ScreenRegistry>,
}
