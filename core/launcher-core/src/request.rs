//! Startup request descriptors.
//!
//! A [`StartupRequest`] is what the platform hands the launcher when the app is
//! started or resumed by an external trigger: an action tag, an optional data
//! reference, an optional MIME type and a bag of typed extras. It is immutable
//! from the launcher's point of view; the launcher only reads it.

use crate::error::{LauncherError, LauncherFfiError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Platform action tags
pub const ACTION_MAIN: &str = "android.intent.action.MAIN";
pub const ACTION_CALL: &str = "android.intent.action.CALL";
pub const ACTION_VIEW: &str = "android.intent.action.VIEW";
pub const ACTION_SEND: &str = "android.intent.action.SEND";
pub const ACTION_SEND_MULTIPLE: &str = "android.intent.action.SEND_MULTIPLE";
pub const ACTION_CALL_LAUNCHED: &str = "org.linphone.intent.action.CallLaunched";

// Incoming extras
pub const EXTRA_TEXT: &str = "android.intent.extra.TEXT";
pub const EXTRA_STREAM: &str = "android.intent.extra.STREAM";
pub const EXTRA_NUMBER_TO_CALL: &str = "NumberToCall";

// Outgoing extras understood by the destination screens
pub const EXTRA_SIP_URI_OR_NUMBER: &str = "SipUriOrNumber";
pub const EXTRA_MSG_SHARED: &str = "msgShared";
pub const EXTRA_FILE_SHARED: &str = "fileShared";

pub const MIME_TEXT_PLAIN: &str = "text/plain";

/// The kind of startup request, decoded from the platform action tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, uniffi::Enum)]
#[serde(rename_all = "snake_case")]
pub enum StartupAction {
    Call,
    View,
    Send,
    SendMultiple,
    /// Internal "call launched" signal raised by other parts of the app.
    CallLaunched,
    Other,
}

impl Default for StartupAction {
    fn default() -> Self {
        Self::Other
    }
}

impl StartupAction {
    /// Maps a platform action tag to an action. Unknown tags (including the
    /// plain launcher `MAIN` action) map to [`StartupAction::Other`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            ACTION_CALL => Self::Call,
            ACTION_VIEW => Self::View,
            ACTION_SEND => Self::Send,
            ACTION_SEND_MULTIPLE => Self::SendMultiple,
            ACTION_CALL_LAUNCHED => Self::CallLaunched,
            _ => Self::Other,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Call => ACTION_CALL,
            Self::View => ACTION_VIEW,
            Self::Send => ACTION_SEND,
            Self::SendMultiple => ACTION_SEND_MULTIPLE,
            Self::CallLaunched => ACTION_CALL_LAUNCHED,
            Self::Other => ACTION_MAIN,
        }
    }
}

/// A typed extra value: either plain text or an opaque URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Enum)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtraValue {
    Text { value: String },
    Uri { value: String },
}

impl ExtraValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    pub fn uri(value: impl Into<String>) -> Self {
        Self::Uri {
            value: value.into(),
        }
    }
}

/// The descriptor that triggered creation of the launcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
pub struct StartupRequest {
    pub action: StartupAction,
    /// Opaque data reference (`sip:`, `tel:`, `content://` ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extras: HashMap<String, ExtraValue>,
}

impl StartupRequest {
    pub fn new(action: StartupAction) -> Self {
        Self {
            action,
            ..Self::default()
        }
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: ExtraValue) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    /// Returns a text extra. URI extras under the same key are not coerced.
    pub fn string_extra(&self, key: &str) -> Option<&str> {
        match self.extras.get(key) {
            Some(ExtraValue::Text { value }) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Returns a URI extra. Text extras under the same key are not coerced.
    pub fn uri_extra(&self, key: &str) -> Option<&str> {
        match self.extras.get(key) {
            Some(ExtraValue::Uri { value }) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Parses a request from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| LauncherError::RequestMalformed {
            details: err.to_string(),
        })
    }
}

/// Parses a JSON startup request for FFI clients that build requests off-platform.
#[uniffi::export]
pub fn parse_startup_request(
    json: String,
) -> std::result::Result<StartupRequest, LauncherFfiError> {
    StartupRequest::from_json(&json).map_err(LauncherFfiError::from)
}

/// Decodes a platform action tag for FFI clients.
#[uniffi::export]
pub fn startup_action_from_tag(tag: String) -> StartupAction {
    StartupAction::from_tag(&tag)
}
