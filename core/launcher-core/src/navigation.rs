//! Outgoing requests and the navigator that carries them.

use crate::request::StartupRequest;
use crate::screens::Screen;
use serde::Serialize;
use std::collections::BTreeMap;

/// The request handed to the destination screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingRequest {
    pub destination: Screen,
    /// Data reference copied from the startup request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, String>,
}

impl OutgoingRequest {
    pub fn new(destination: Screen) -> Self {
        Self {
            destination,
            data: None,
            extras: BTreeMap::new(),
        }
    }

    pub fn put_extra(&mut self, key: &str, value: impl Into<String>) {
        self.extras.insert(key.to_string(), value.into());
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }
}

/// Host-side screen transitions. Implementations must be called from the
/// UI-bound scheduler.
pub trait Navigator: Send + Sync {
    /// Starts (or brings forward) the destination screen with `request`.
    fn navigate(&self, request: OutgoingRequest);

    /// Closes `screen` without navigating anywhere.
    fn finish(&self, screen: Screen);

    /// Re-enters the launcher with the original, unmodified startup request.
    fn restart_launcher(&self, request: StartupRequest);

    /// Pins the launcher to portrait orientation.
    fn lock_portrait_orientation(&self) {}
}
