//! Startup request classification.
//!
//! Pure decision logic: given the request that launched the app, work out
//! whether it names an address to call directly, a contact reference that has
//! to be resolved first, or nothing at all. Shares, multi-shares and the
//! internal call-launched signal are deliberately left for the dispatcher,
//! which runs once the destination screen is known.
//!
//! ```text
//! StartupRequest ──classify()──▶ StartupIntent ──ResolvedTarget::from_intent()──▶ dispatcher
//! ```

use crate::collaborators::ContactResolver;
use crate::request::{StartupAction, StartupRequest};
use serde::Serialize;

const SIP_SCHEME: &str = "sip:";
const TEL_SCHEME: &str = "tel:";

/// Intermediate result of classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, uniffi::Enum)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StartupIntent {
    /// Call this address as soon as the destination screen is up.
    DirectCall { address: String },
    /// Resolve this contact reference to an address once the background
    /// process is ready.
    ResolveContact { uri: String },
    None,
}

/// Classifies a startup request. Reads the request only.
pub fn classify(request: &StartupRequest) -> StartupIntent {
    let Some(data) = request.data.as_deref() else {
        return StartupIntent::None;
    };

    match request.action {
        StartupAction::Call => StartupIntent::DirectCall {
            address: decode_call_address(data),
        },
        StartupAction::View => StartupIntent::ResolveContact {
            uri: data.to_string(),
        },
        _ => StartupIntent::None,
    }
}

/// Turns a call data reference into a plain address.
///
/// Only the escapes for `@` and `:` are decoded, then a leading `sip:` or
/// `tel:` scheme is stripped. `sip:user%40host` becomes `user@host`.
#[uniffi::export]
pub fn decode_call_address(uri: &str) -> String {
    let decoded = uri.replace("%40", "@").replace("%3A", ":");

    if let Some(rest) = decoded.strip_prefix(SIP_SCHEME) {
        rest.to_string()
    } else if let Some(rest) = decoded.strip_prefix(TEL_SCHEME) {
        rest.to_string()
    } else {
        decoded
    }
}

/// FFI entry point for [`classify`].
#[uniffi::export]
pub fn classify_startup_request(request: StartupRequest) -> StartupIntent {
    classify(&request)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Resolved Target
// ═══════════════════════════════════════════════════════════════════════════════

/// Scratch result threaded from classification to dispatch.
///
/// The dispatcher `take`s both fields, so whatever was resolved is delivered
/// at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub address_to_call: Option<String>,
    pub uri_to_resolve: Option<String>,
}

impl ResolvedTarget {
    /// Builds the target for `intent`.
    ///
    /// Contact references are resolved on the spot when the background process
    /// is already ready; otherwise they are deferred until dispatch.
    pub fn from_intent(
        intent: StartupIntent,
        process_ready: bool,
        contacts: &dyn ContactResolver,
    ) -> Self {
        match intent {
            StartupIntent::DirectCall { address } => Self {
                address_to_call: Some(address),
                uri_to_resolve: None,
            },
            StartupIntent::ResolveContact { uri } if process_ready => Self {
                address_to_call: contacts.resolve_address_or_number(&uri),
                uri_to_resolve: None,
            },
            StartupIntent::ResolveContact { uri } => Self {
                address_to_call: None,
                uri_to_resolve: Some(uri),
            },
            StartupIntent::None => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.address_to_call.is_none() && self.uri_to_resolve.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
