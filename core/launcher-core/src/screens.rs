//! Registry of live screens.
//!
//! The dispatcher never holds references to concrete screen types. Screens that
//! are currently alive register a [`ScreenHandler`]; the dispatcher sends them
//! [`ScreenEvent`]s through the registry and falls back to the
//! navigation-carried payload when nothing is registered.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Screens the launcher knows how to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    /// The launcher itself (entry point of every startup sequence).
    Launcher,
    Main,
    RemoteProvisioning,
    Tutorial,
    Call,
}

/// Events delivered synchronously to a live screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScreenEvent {
    ShowIncomingCall,
    DisplayChat {
        message: Option<String>,
        file_path: Option<String>,
    },
}

pub trait ScreenHandler: Send + Sync {
    fn handle(&self, event: &ScreenEvent);
}

#[derive(Default)]
pub struct ScreenRegistry {
    live: Mutex<HashMap<Screen, Arc<dyn ScreenHandler>>>,
}

impl ScreenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a live screen, replacing any previous handler for it.
    pub fn register(&self, screen: Screen, handler: Arc<dyn ScreenHandler>) {
        if let Ok(mut live) = self.live.lock() {
            live.insert(screen, handler);
            tracing::debug!(screen = ?screen, "Screen registered");
        }
    }

    pub fn unregister(&self, screen: Screen) {
        if let Ok(mut live) = self.live.lock() {
            if live.remove(&screen).is_some() {
                tracing::debug!(screen = ?screen, "Screen unregistered");
            }
        }
    }

    pub fn is_live(&self, screen: Screen) -> bool {
        self.live
            .lock()
            .map(|live| live.contains_key(&screen))
            .unwrap_or(false)
    }

    /// Delivers `event` to the live handler for `screen`.
    ///
    /// Returns false when the screen is not live. The handler runs outside the
    /// registry lock so it may register or unregister screens itself.
    pub fn deliver(&self, screen: Screen, event: &ScreenEvent) -> bool {
        let handler = match self.live.lock() {
            Ok(live) => live.get(&screen).cloned(),
            Err(_) => None,
        };

        match handler {
            Some(handler) => {
                handler.handle(event);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for ScreenRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let screens: Vec<Screen> = self
            .live
            .lock()
            .map(|live| live.keys().copied().collect())
            .unwrap_or_default();
        f.debug_struct("ScreenRegistry")
            .field("live", &screens)
            .finish()
    }
}
