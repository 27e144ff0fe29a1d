//! Deferred dispatch.
//!
//! Runs on the UI scheduler once the background process is confirmed ready
//! (and the settling delay has passed). It re-reads the startup request,
//! picks the destination screen, attaches shares and the address to call,
//! navigates, and finally takes the same-process fast path for shares when
//! the main screen is already live.
//!
//! ## Order of operations
//!
//! 1. Select destination (remote provisioning, tutorial or main)
//! 2. Attach shared text / shared file
//! 3. Handle the internal call-launched signal
//! 4. Resolve a deferred contact reference
//! 5. Attach the address to call
//! 6. Navigate
//! 7. Fast-path the share to a live main screen

use crate::classifier::ResolvedTarget;
use crate::collaborators::Collaborators;
use crate::config::LauncherConfig;
use crate::navigation::OutgoingRequest;
use crate::request::{
    StartupAction, StartupRequest, EXTRA_FILE_SHARED, EXTRA_MSG_SHARED, EXTRA_NUMBER_TO_CALL,
    EXTRA_SIP_URI_OR_NUMBER, EXTRA_STREAM, EXTRA_TEXT, MIME_TEXT_PLAIN,
};
use crate::screens::{Screen, ScreenEvent};
use chrono::{DateTime, Utc};
use serde::Serialize;

// ═══════════════════════════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════════════════════════

/// Content shared into the app by a send request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingShare {
    Text {
        text: String,
    },
    File {
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        path: Option<String>,
    },
}

/// What happened to an internal call-launched signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallSignalOutcome {
    /// A live call screen was told to show its incoming-call view.
    ShowedIncomingCall,
    /// No call screen was live; the call manager originated the call.
    OriginatedCall { number: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub destination: Screen,
    pub outgoing: OutgoingRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share: Option<PendingShare>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_signal: Option<CallSignalOutcome>,
    /// The share was also delivered straight to a live main screen.
    pub fast_path_delivered: bool,
    pub dispatched_at: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Destination Selection
// ═══════════════════════════════════════════════════════════════════════════════

/// Picks the screen the launcher hands off to.
pub fn select_destination(config: &LauncherConfig, first_remote_provisioning: bool) -> Screen {
    select_destination_screen(
        config.startup.show_tutorials_instead_of_app,
        config.provisioning.display_remote_provisioning,
        first_remote_provisioning,
    )
}

/// FFI form of [`select_destination`].
///
/// The tutorial takes precedence when enabled; it is off unless configured.
#[uniffi::export]
pub fn select_destination_screen(
    show_tutorials_instead_of_app: bool,
    display_remote_provisioning: bool,
    first_remote_provisioning: bool,
) -> Screen {
    if show_tutorials_instead_of_app {
        Screen::Tutorial
    } else if display_remote_provisioning && first_remote_provisioning {
        Screen::RemoteProvisioning
    } else {
        Screen::Main
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Dispatcher
// ═══════════════════════════════════════════════════════════════════════════════

pub struct Dispatcher {
    config: LauncherConfig,
    collaborators: Collaborators,
}

impl Dispatcher {
    pub fn new(config: LauncherConfig, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    /// Dispatches `request`. Must run on the UI scheduler with the background
    /// process ready.
    ///
    /// Both fields of `target` are consumed, so running this twice with the
    /// same target cannot deliver the same address twice.
    pub fn dispatch(
        &self,
        request: &StartupRequest,
        target: &mut ResolvedTarget,
    ) -> DispatchReport {
        let destination = select_destination(
            &self.config,
            self.collaborators.preferences.is_first_remote_provisioning(),
        );
        tracing::info!(
            destination = ?destination,
            action = ?request.action,
            "Dispatching startup request"
        );

        let mut outgoing = OutgoingRequest::new(destination);
        outgoing.data = request.data.clone();

        let share = self.attach_share(request, &mut outgoing);
        let call_signal = self.handle_call_signal(request);

        if let Some(uri) = target.uri_to_resolve.take() {
            target.address_to_call = self.collaborators.contacts.resolve_address_or_number(&uri);
            match &target.address_to_call {
                Some(_) => tracing::info!(uri = %uri, "Resolved deferred contact reference"),
                None => {
                    tracing::warn!(uri = %uri, "Contact reference did not resolve to an address")
                }
            }
        }

        if let Some(address) = target.address_to_call.take() {
            tracing::info!(address = %address, "Startup request has address to call");
            outgoing.put_extra(EXTRA_SIP_URI_OR_NUMBER, address);
        }

        self.collaborators.navigator.navigate(outgoing.clone());

        let fast_path_delivered = match (&share, destination) {
            (Some(share), Screen::Main) => self.deliver_share_to_live_main(share),
            _ => false,
        };

        DispatchReport {
            destination,
            outgoing,
            share,
            call_signal,
            fast_path_delivered,
            dispatched_at: Utc::now(),
        }
    }

    fn attach_share(
        &self,
        request: &StartupRequest,
        outgoing: &mut OutgoingRequest,
    ) -> Option<PendingShare> {
        let mime_type = request.mime_type.as_deref()?;

        match request.action {
            StartupAction::Send => {
                if mime_type == MIME_TEXT_PLAIN {
                    if let Some(text) = request.string_extra(EXTRA_TEXT) {
                        outgoing.put_extra(EXTRA_MSG_SHARED, text);
                        return Some(PendingShare::Text {
                            text: text.to_string(),
                        });
                    }
                }

                let uri = request.uri_extra(EXTRA_STREAM)?;
                let path = self.collaborators.files.resolve_file_path(uri);
                match &path {
                    Some(path) => outgoing.put_extra(EXTRA_FILE_SHARED, path.as_str()),
                    None => {
                        tracing::warn!(uri = %uri, "Shared stream did not resolve to a file path")
                    }
                }
                Some(PendingShare::File {
                    uri: uri.to_string(),
                    path,
                })
            }
            StartupAction::SendMultiple => {
                tracing::debug!(
                    mime_type = %mime_type,
                    "Multi-file share is not supported; ignoring"
                );
                None
            }
            _ => None,
        }
    }

    fn handle_call_signal(&self, request: &StartupRequest) -> Option<CallSignalOutcome> {
        if request.action != StartupAction::CallLaunched {
            return None;
        }
        let number = request.string_extra(EXTRA_NUMBER_TO_CALL)?;

        if self
            .collaborators
            .screens
            .deliver(Screen::Call, &ScreenEvent::ShowIncomingCall)
        {
            tracing::info!("Call screen live; showing incoming-call view");
            Some(CallSignalOutcome::ShowedIncomingCall)
        } else {
            tracing::info!(number = %number, "Originating outgoing call");
            self.collaborators.calls.originate_call(number);
            Some(CallSignalOutcome::OriginatedCall {
                number: number.to_string(),
            })
        }
    }

    fn deliver_share_to_live_main(&self, share: &PendingShare) -> bool {
        let event = match share {
            PendingShare::Text { text } => ScreenEvent::DisplayChat {
                message: Some(text.clone()),
                file_path: None,
            },
            PendingShare::File { path, .. } => ScreenEvent::DisplayChat {
                message: None,
                file_path: path.clone(),
            },
        };
        self.collaborators.screens.deliver(Screen::Main, &event)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::test_utils::{
        Fakes, FixedPreferences, MapContacts, MapFiles, RecordingScreen,
    };
    use crate::request::ExtraValue;
    use std::sync::Arc;

    fn dispatcher(fakes: &Fakes) -> Dispatcher {
        Dispatcher::new(LauncherConfig::default(), fakes.collaborators())
    }

    fn dispatch_once(fakes: &Fakes, request: &StartupRequest) -> DispatchReport {
        dispatcher(fakes).dispatch(request, &mut ResolvedTarget::default())
    }

    fn text_share(text: &str) -> StartupRequest {
        StartupRequest::new(StartupAction::Send)
            .with_mime_type(MIME_TEXT_PLAIN)
            .with_extra(EXTRA_TEXT, ExtraValue::text(text))
    }

    fn file_share(uri: &str) -> StartupRequest {
        StartupRequest::new(StartupAction::Send)
            .with_mime_type("image/png")
            .with_extra(EXTRA_STREAM, ExtraValue::uri(uri))
    }

    fn call_signal(number: &str) -> StartupRequest {
        StartupRequest::new(StartupAction::CallLaunched)
            .with_extra(EXTRA_NUMBER_TO_CALL, ExtraValue::text(number))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Destination selection
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_default_destination_is_main() {
        assert_eq!(select_destination_screen(false, false, false), Screen::Main);
        assert_eq!(select_destination_screen(false, false, true), Screen::Main);
        assert_eq!(select_destination_screen(false, true, false), Screen::Main);
    }

    #[test]
    fn test_first_remote_provisioning_goes_to_provisioning_screen() {
        assert_eq!(
            select_destination_screen(false, true, true),
            Screen::RemoteProvisioning
        );
    }

    #[test]
    fn test_tutorial_hook_wins_when_enabled() {
        assert_eq!(select_destination_screen(true, true, true), Screen::Tutorial);
    }

    #[test]
    fn test_dispatch_uses_provisioning_destination() {
        let fakes = Fakes {
            preferences: Arc::new(FixedPreferences::first_run()),
            ..Fakes::ready()
        };
        let mut config = LauncherConfig::default();
        config.provisioning.display_remote_provisioning = true;
        let dispatcher = Dispatcher::new(config, fakes.collaborators());

        let report = dispatcher.dispatch(
            &StartupRequest::default(),
            &mut ResolvedTarget::default(),
        );

        assert_eq!(report.destination, Screen::RemoteProvisioning);
        assert_eq!(
            fakes.navigator.navigations()[0].destination,
            Screen::RemoteProvisioning
        );
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Shares
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_text_share_attaches_msg_shared() {
        let fakes = Fakes::ready();
        let report = dispatch_once(&fakes, &text_share("hello"));

        assert_eq!(report.outgoing.extra(EXTRA_MSG_SHARED), Some("hello"));
        assert_eq!(
            report.share,
            Some(PendingShare::Text {
                text: "hello".to_string()
            })
        );
        assert!(!report.fast_path_delivered);
        assert_eq!(fakes.navigator.navigations(), vec![report.outgoing]);
    }

    #[test]
    fn test_file_share_attaches_resolved_path() {
        let fakes = Fakes {
            files: Arc::new(MapFiles::with("content://media/9", "/sdcard/DCIM/cat.png")),
            ..Fakes::ready()
        };
        let report = dispatcher(&fakes).dispatch(
            &file_share("content://media/9"),
            &mut ResolvedTarget::default(),
        );

        assert_eq!(
            report.outgoing.extra(EXTRA_FILE_SHARED),
            Some("/sdcard/DCIM/cat.png")
        );
        assert!(report.outgoing.extra(EXTRA_MSG_SHARED).is_none());
    }

    #[test]
    fn test_unresolved_file_share_attaches_nothing() {
        let fakes = Fakes::ready();
        let report = dispatcher(&fakes).dispatch(
            &file_share("content://media/404"),
            &mut ResolvedTarget::default(),
        );

        assert!(report.outgoing.extras.is_empty());
        assert_eq!(
            report.share,
            Some(PendingShare::File {
                uri: "content://media/404".to_string(),
                path: None
            })
        );
    }

    #[test]
    fn test_text_plain_without_text_falls_back_to_stream() {
        let fakes = Fakes {
            files: Arc::new(MapFiles::with("content://notes/1", "/data/notes/1.txt")),
            ..Fakes::ready()
        };
        let request = StartupRequest::new(StartupAction::Send)
            .with_mime_type(MIME_TEXT_PLAIN)
            .with_extra(EXTRA_STREAM, ExtraValue::uri("content://notes/1"));

        let report = dispatch_once(&fakes, &request);
        assert_eq!(
            report.outgoing.extra(EXTRA_FILE_SHARED),
            Some("/data/notes/1.txt")
        );
    }

    #[test]
    fn test_share_without_mime_type_is_ignored() {
        let fakes = Fakes::ready();
        let request =
            StartupRequest::new(StartupAction::Send).with_extra(EXTRA_TEXT, ExtraValue::text("hi"));

        let report = dispatch_once(&fakes, &request);
        assert!(report.share.is_none());
        assert!(report.outgoing.extras.is_empty());
    }

    #[test]
    fn test_multi_file_share_is_a_no_op() {
        let fakes = Fakes::ready();
        let request = StartupRequest::new(StartupAction::SendMultiple)
            .with_mime_type("image/jpeg")
            .with_extra(EXTRA_STREAM, ExtraValue::uri("content://media/1"));

        let report = dispatch_once(&fakes, &request);
        assert!(report.share.is_none());
        assert!(report.outgoing.extras.is_empty());
        assert_eq!(fakes.navigator.navigations().len(), 1);
    }

    #[test]
    fn test_live_main_screen_receives_text_share_directly() {
        let fakes = Fakes::ready();
        let main = Arc::new(RecordingScreen::default());
        fakes.screens.register(Screen::Main, main.clone());

        let report = dispatch_once(&fakes, &text_share("hello"));

        assert!(report.fast_path_delivered);
        assert_eq!(report.outgoing.extra(EXTRA_MSG_SHARED), Some("hello"));
        assert_eq!(
            main.events(),
            vec![ScreenEvent::DisplayChat {
                message: Some("hello".to_string()),
                file_path: None
            }]
        );
    }

    #[test]
    fn test_live_main_screen_receives_file_share_directly() {
        let fakes = Fakes {
            files: Arc::new(MapFiles::with("content://media/9", "/sdcard/cat.png")),
            ..Fakes::ready()
        };
        let main = Arc::new(RecordingScreen::default());
        fakes.screens.register(Screen::Main, main.clone());

        dispatch_once(&fakes, &file_share("content://media/9"));

        assert_eq!(
            main.events(),
            vec![ScreenEvent::DisplayChat {
                message: None,
                file_path: Some("/sdcard/cat.png".to_string())
            }]
        );
    }

    #[test]
    fn test_fast_path_skipped_for_provisioning_destination() {
        let fakes = Fakes {
            preferences: Arc::new(FixedPreferences::first_run()),
            ..Fakes::ready()
        };
        let main = Arc::new(RecordingScreen::default());
        fakes.screens.register(Screen::Main, main.clone());
        let mut config = LauncherConfig::default();
        config.provisioning.display_remote_provisioning = true;

        let report = Dispatcher::new(config, fakes.collaborators())
            .dispatch(&text_share("hello"), &mut ResolvedTarget::default());

        assert!(!report.fast_path_delivered);
        assert!(main.events().is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Call-launched signal
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_call_signal_without_live_call_screen_originates_call() {
        let fakes = Fakes::ready();
        let report = dispatch_once(&fakes, &call_signal("42"));

        assert_eq!(fakes.calls.calls(), vec!["42".to_string()]);
        assert_eq!(
            report.call_signal,
            Some(CallSignalOutcome::OriginatedCall {
                number: "42".to_string()
            })
        );
    }

    #[test]
    fn test_call_signal_with_live_call_screen_shows_incoming_view() {
        let fakes = Fakes::ready();
        let call_screen = Arc::new(RecordingScreen::default());
        fakes.screens.register(Screen::Call, call_screen.clone());

        let report = dispatch_once(&fakes, &call_signal("42"));

        assert!(fakes.calls.calls().is_empty());
        assert_eq!(call_screen.events(), vec![ScreenEvent::ShowIncomingCall]);
        assert_eq!(report.call_signal, Some(CallSignalOutcome::ShowedIncomingCall));
    }

    #[test]
    fn test_call_signal_without_number_is_ignored() {
        let fakes = Fakes::ready();
        let report = dispatcher(&fakes).dispatch(
            &StartupRequest::new(StartupAction::CallLaunched),
            &mut ResolvedTarget::default(),
        );

        assert!(report.call_signal.is_none());
        assert!(fakes.calls.calls().is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Address delivery
    // ─────────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_address_is_attached_and_consumed() {
        let fakes = Fakes::ready();
        let mut target = ResolvedTarget {
            address_to_call: Some("user@host".to_string()),
            uri_to_resolve: None,
        };

        let report = dispatcher(&fakes).dispatch(
            &StartupRequest::new(StartupAction::Call).with_data("sip:user%40host"),
            &mut target,
        );

        assert_eq!(report.outgoing.extra(EXTRA_SIP_URI_OR_NUMBER), Some("user@host"));
        assert_eq!(report.outgoing.data.as_deref(), Some("sip:user%40host"));
        assert!(target.is_empty());
    }

    #[test]
    fn test_deferred_contact_is_resolved_at_dispatch() {
        let fakes = Fakes {
            contacts: Arc::new(MapContacts::with("content://contacts/7", "0612345678")),
            ..Fakes::ready()
        };
        let mut target = ResolvedTarget {
            address_to_call: None,
            uri_to_resolve: Some("content://contacts/7".to_string()),
        };

        let report = dispatcher(&fakes).dispatch(&StartupRequest::default(), &mut target);

        assert_eq!(report.outgoing.extra(EXTRA_SIP_URI_OR_NUMBER), Some("0612345678"));
        assert!(target.is_empty());
        assert_eq!(fakes.contacts.lookups(), 1);
    }

    #[test]
    fn test_second_dispatch_does_not_redeliver_address() {
        let fakes = Fakes::ready();
        let dispatcher = dispatcher(&fakes);
        let mut target = ResolvedTarget {
            address_to_call: Some("12345".to_string()),
            uri_to_resolve: None,
        };
        let request = StartupRequest::default();

        dispatcher.dispatch(&request, &mut target);
        let second = dispatcher.dispatch(&request, &mut target);

        assert!(second.outgoing.extra(EXTRA_SIP_URI_OR_NUMBER).is_none());
        assert!(target.is_empty());
    }
}
