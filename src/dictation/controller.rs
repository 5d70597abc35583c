//! Dictation buffer controller
//!
//! Mediates between the event-driven recognition capability and the single
//! text buffer the user sees and edits. Recognized speech is anchored at the
//! composer contents captured when the session started (the base text);
//! settled fragments accumulate into a committed transcript, while interim
//! fragments are shown as a preview and discarded when the session ends.

use crossbeam_channel::{Receiver, Sender};
use std::fmt;
use tracing::{debug, warn};

use super::recognizer::{
    RecognitionErrorReason, RecognitionEvent, RecognizerConfig, SpeechRecognizer,
};

/// Status text when the platform lacks the recognition capability or the
/// microphone has been permanently lost.
const MSG_UNAVAILABLE: &str = "Speech recognition is not available on this device.";

/// Status text when session activation throws.
const MSG_ACTIVATION_FAILED: &str = "Could not start speech recognition. Please try again.";

/// Dictation session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DictationState {
    /// No session active. Ready to start.
    Idle,
    /// A recognition session is active and delivering results.
    Listening,
    /// A recognition failure is being surfaced. Transient: the controller
    /// returns to `Idle` as soon as the side effects are applied.
    Error(RecognitionErrorReason),
}

impl fmt::Display for DictationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictationState::Idle => write!(f, "Idle"),
            DictationState::Listening => write!(f, "Listening"),
            DictationState::Error(reason) => write!(f, "Error({reason:?})"),
        }
    }
}

/// Message emitted to the surrounding application when the user sends.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub text: String,
}

/// Owns the composer buffer and the dictation session lifecycle.
///
/// Constructed once per chat view. Any active recognition session is
/// cancelled when the controller is dropped.
pub struct DictationController {
    recognizer: Box<dyn SpeechRecognizer>,
    events_rx: Receiver<RecognitionEvent>,
    config: RecognizerConfig,

    composer_text: String,
    state: DictationState,

    /// Composer snapshot taken when the current session started.
    base_text: String,
    /// Settled transcript accumulated during the current session.
    committed: String,

    /// Permanently false once the capability reports it is unsupported,
    /// unauthorized, or the device is missing.
    mic_available: bool,

    /// Raised on every composer mutation; the view consumes it and re-runs
    /// its height computation.
    resize_pending: bool,

    last_error: Option<RecognitionErrorReason>,
    outbound_tx: Option<Sender<OutboundMessage>>,
}

impl DictationController {
    pub fn new(
        recognizer: Box<dyn SpeechRecognizer>,
        events_rx: Receiver<RecognitionEvent>,
        config: RecognizerConfig,
    ) -> Self {
        Self {
            recognizer,
            events_rx,
            config,
            composer_text: String::new(),
            state: DictationState::Idle,
            base_text: String::new(),
            committed: String::new(),
            mic_available: true,
            resize_pending: false,
            last_error: None,
            outbound_tx: None,
        }
    }

    /// Wire the channel that receives sent messages.
    pub fn with_outbound(mut self, outbound_tx: Sender<OutboundMessage>) -> Self {
        self.outbound_tx = Some(outbound_tx);
        self
    }

    pub fn composer_text(&self) -> &str {
        &self.composer_text
    }

    pub fn state(&self) -> DictationState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == DictationState::Listening
    }

    pub fn mic_available(&self) -> bool {
        self.mic_available
    }

    pub fn last_error(&self) -> Option<RecognitionErrorReason> {
        self.last_error
    }

    /// Consume the pending resize request, if any. Returns whether the view
    /// should re-run its height computation.
    pub fn take_resize_request(&mut self) -> bool {
        std::mem::take(&mut self.resize_pending)
    }

    /// Direct user edit. Always legal, always overwrites.
    ///
    /// Edits made while listening are not merged into the base text; the
    /// next recognition event may overwrite them. A session started after
    /// the edit anchors on the new contents.
    pub fn set_composer_text(&mut self, text: impl Into<String>) {
        self.set_text(text.into());
    }

    /// Start a dictation session, anchoring on the current composer text.
    ///
    /// No-op while already listening. Writes an unavailability message when
    /// the capability is missing or the microphone was permanently lost,
    /// without attempting activation.
    pub fn start_dictation(&mut self) {
        if self.state == DictationState::Listening {
            return;
        }

        if !self.mic_available || !self.recognizer.is_supported() {
            warn!("dictation requested but recognition capability is unavailable");
            self.mic_available = false;
            self.set_text(MSG_UNAVAILABLE.to_string());
            return;
        }

        self.base_text = self.composer_text.clone();
        self.committed.clear();

        match self.recognizer.begin(&self.config) {
            Ok(()) => {
                debug!(base = %self.base_text, "dictation session started");
                self.state = DictationState::Listening;
            }
            Err(e) => {
                warn!(error = %e, "recognition activation failed");
                self.mic_available = false;
                self.last_error = Some(RecognitionErrorReason::Other);
                self.set_text(MSG_ACTIVATION_FAILED.to_string());
                self.state = DictationState::Idle;
            }
        }
    }

    /// Stop the active dictation session. Idempotent; no-op when idle.
    pub fn stop_dictation(&mut self) {
        if self.state != DictationState::Listening {
            return;
        }
        self.recognizer.cancel();
        self.finish_session();
        debug!("dictation session stopped by user");
    }

    /// Stop if listening, otherwise start.
    pub fn toggle_dictation(&mut self) {
        if self.is_listening() {
            self.stop_dictation();
        } else {
            self.start_dictation();
        }
    }

    /// Drain pending recognition events and apply them in order.
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// Apply one recognition event to the state machine.
    pub fn handle_event(&mut self, event: RecognitionEvent) {
        match event {
            RecognitionEvent::Started => {
                debug!("recognition session confirmed by capability");
            }
            RecognitionEvent::Result(segments) => {
                if self.state != DictationState::Listening {
                    return;
                }
                self.apply_result(&segments);
            }
            RecognitionEvent::Error(reason) => {
                if self.state != DictationState::Listening {
                    return;
                }
                self.apply_error(reason);
            }
            RecognitionEvent::Ended => {
                // Also arrives after an error, by which point we are already
                // idle and the status message must be preserved.
                self.finish_session();
            }
        }
    }

    /// Trim and emit the composer contents, then clear the buffer.
    /// No-op on blank input.
    pub fn submit(&mut self) -> Option<String> {
        let text = self.composer_text.trim();
        if text.is_empty() {
            return None;
        }
        let text = text.to_string();

        if let Some(tx) = &self.outbound_tx {
            let _ = tx.send(OutboundMessage { text: text.clone() });
        }

        debug!(text = %text, "message submitted");
        self.set_text(String::new());
        // Sending mid-session re-anchors the dictation on the now-empty
        // field: only speech recognized after the send may appear.
        self.base_text.clear();
        self.committed.clear();
        Some(text)
    }

    /// Cancel any active session. Called on teardown.
    pub fn shutdown(&mut self) {
        if self.state == DictationState::Listening {
            self.recognizer.cancel();
            self.state = DictationState::Idle;
            debug!("active dictation session cancelled on teardown");
        }
    }

    fn apply_result(&mut self, segments: &[super::recognizer::TranscriptSegment]) {
        let mut finals = String::new();
        let mut interim = String::new();
        for segment in segments {
            if segment.is_final {
                finals.push_str(&segment.text);
            } else {
                interim.push_str(&segment.text);
            }
        }

        if !finals.is_empty() {
            // A settled fragment supersedes any interim preview.
            self.committed.push_str(&finals);
            let text = format!("{}{}", self.base_text, self.committed);
            self.set_text(text);
            debug!(committed = %self.committed, "final fragment applied");
        } else if !interim.is_empty() {
            let text = format!("{}{}{}", self.base_text, self.committed, interim);
            self.set_text(text);
        }
    }

    fn apply_error(&mut self, reason: RecognitionErrorReason) {
        warn!(?reason, "recognition session failed");
        self.state = DictationState::Error(reason);
        self.last_error = Some(reason);
        if reason.is_permanent() {
            self.mic_available = false;
        }
        // The status message replaces whatever the field held, typed input
        // included. Observed behavior of the capability integration.
        self.set_text(reason.user_message().to_string());
        self.committed.clear();
        // Errors are transient UI state, not a persisted fault.
        self.state = DictationState::Idle;
    }

    /// End the session, keeping only the settled transcript.
    fn finish_session(&mut self) {
        if self.state != DictationState::Listening {
            return;
        }
        let text = format!("{}{}", self.base_text, self.committed);
        self.set_text(text);
        self.committed.clear();
        self.state = DictationState::Idle;
        debug!("dictation session ended");
    }

    fn set_text(&mut self, text: String) {
        self.composer_text = text;
        self.resize_pending = true;
    }
}

impl Drop for DictationController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::super::recognizer::{ScriptedRecognizer, TranscriptSegment};
    use super::*;
    use crossbeam_channel::unbounded;
    use std::sync::atomic::Ordering;

    fn listening_controller() -> DictationController {
        let (recognizer, events_rx) = ScriptedRecognizer::new();
        let mut controller =
            DictationController::new(Box::new(recognizer), events_rx, RecognizerConfig::default());
        controller.start_dictation();
        assert_eq!(controller.state(), DictationState::Listening);
        controller
    }

    #[test]
    fn final_fragments_accumulate_onto_base_text() {
        let (recognizer, events_rx) = ScriptedRecognizer::new();
        let mut controller =
            DictationController::new(Box::new(recognizer), events_rx, RecognizerConfig::default());
        controller.set_composer_text("note: ");
        controller.start_dictation();
        assert_eq!(controller.state(), DictationState::Listening);

        controller.handle_event(RecognitionEvent::Result(vec![TranscriptSegment::finalized(
            "find ",
        )]));
        assert_eq!(controller.composer_text(), "note: find ");

        controller.handle_event(RecognitionEvent::Result(vec![TranscriptSegment::finalized(
            "a desk",
        )]));
        assert_eq!(controller.composer_text(), "note: find a desk");
    }

    #[test]
    fn interim_fragments_preview_but_do_not_commit() {
        let mut controller = listening_controller();

        controller.handle_event(RecognitionEvent::Result(vec![TranscriptSegment::interim(
            "fin",
        )]));
        assert_eq!(controller.composer_text(), "fin");

        controller.handle_event(RecognitionEvent::Result(vec![TranscriptSegment::interim(
            "find a de",
        )]));
        assert_eq!(controller.composer_text(), "find a de");

        // A final fragment supersedes the interim preview entirely.
        controller.handle_event(RecognitionEvent::Result(vec![TranscriptSegment::finalized(
            "find a desk",
        )]));
        assert_eq!(controller.composer_text(), "find a desk");
    }

    #[test]
    fn interim_text_is_discarded_at_session_end() {
        let mut controller = listening_controller();

        controller.handle_event(RecognitionEvent::Result(vec![TranscriptSegment::finalized(
            "find a desk",
        )]));
        controller.handle_event(RecognitionEvent::Result(vec![TranscriptSegment::interim(
            " near the win",
        )]));
        assert_eq!(controller.composer_text(), "find a desk near the win");

        controller.handle_event(RecognitionEvent::Ended);
        assert_eq!(controller.composer_text(), "find a desk");
        assert_eq!(controller.state(), DictationState::Idle);
    }

    #[test]
    fn mixed_event_applies_finals_and_drops_interim() {
        let mut controller = listening_controller();

        controller.handle_event(RecognitionEvent::Result(vec![
            TranscriptSegment::finalized("find "),
            TranscriptSegment::interim("a de"),
        ]));
        // The event carried a final fragment, so the interim is discarded.
        assert_eq!(controller.composer_text(), "find ");
    }

    #[test]
    fn end_after_final_fragment_keeps_the_transcript() {
        let mut controller = listening_controller();

        controller.handle_event(RecognitionEvent::Result(vec![TranscriptSegment::finalized(
            "find a desk",
        )]));
        assert_eq!(controller.composer_text(), "find a desk");

        controller.handle_event(RecognitionEvent::Ended);
        assert_eq!(controller.composer_text(), "find a desk");
    }

    #[test]
    fn stop_dictation_is_idempotent() {
        let mut controller = listening_controller();
        controller.handle_event(RecognitionEvent::Result(vec![TranscriptSegment::finalized(
            "hello",
        )]));

        controller.stop_dictation();
        let after_first = (
            controller.composer_text().to_string(),
            controller.state(),
            controller.mic_available(),
        );

        controller.stop_dictation();
        let after_second = (
            controller.composer_text().to_string(),
            controller.state(),
            controller.mic_available(),
        );

        assert_eq!(after_first, after_second);
        assert_eq!(controller.state(), DictationState::Idle);
    }

    #[test]
    fn late_ended_event_after_stop_is_a_no_op() {
        let mut controller = listening_controller();
        controller.handle_event(RecognitionEvent::Result(vec![TranscriptSegment::finalized(
            "hello",
        )]));
        controller.stop_dictation();
        assert_eq!(controller.composer_text(), "hello");

        // The capability still delivers its end-of-session signal.
        controller.handle_event(RecognitionEvent::Ended);
        assert_eq!(controller.composer_text(), "hello");
        assert_eq!(controller.state(), DictationState::Idle);
    }

    #[test]
    fn submit_trims_emits_and_clears() {
        let (recognizer, events_rx) = ScriptedRecognizer::new();
        let (outbound_tx, outbound_rx) = unbounded();
        let mut controller =
            DictationController::new(Box::new(recognizer), events_rx, RecognizerConfig::default())
                .with_outbound(outbound_tx);

        controller.set_composer_text("  hello  ");
        let sent = controller.submit();

        assert_eq!(sent.as_deref(), Some("hello"));
        assert_eq!(controller.composer_text(), "");
        assert_eq!(
            outbound_rx.try_recv().unwrap(),
            OutboundMessage {
                text: "hello".to_string()
            }
        );
    }

    #[test]
    fn submit_while_listening_does_not_resurrect_sent_text() {
        let mut controller = listening_controller();

        controller.handle_event(RecognitionEvent::Result(vec![TranscriptSegment::finalized(
            "hello",
        )]));
        assert_eq!(controller.composer_text(), "hello");

        assert_eq!(controller.submit().as_deref(), Some("hello"));
        assert_eq!(controller.composer_text(), "");

        // Speech recognized after the send starts from the empty field.
        controller.handle_event(RecognitionEvent::Result(vec![TranscriptSegment::finalized(
            " world",
        )]));
        assert_eq!(controller.composer_text(), " world");

        controller.handle_event(RecognitionEvent::Ended);
        assert_eq!(controller.composer_text(), " world");
    }

    #[test]
    fn submit_on_blank_text_is_a_no_op() {
        let (recognizer, events_rx) = ScriptedRecognizer::new();
        let (outbound_tx, outbound_rx) = unbounded();
        let mut controller =
            DictationController::new(Box::new(recognizer), events_rx, RecognizerConfig::default())
                .with_outbound(outbound_tx);

        controller.set_composer_text("   \n  ");
        assert_eq!(controller.submit(), None);
        assert_eq!(controller.composer_text(), "   \n  ");
        assert!(outbound_rx.try_recv().is_err());
    }

    #[test]
    fn permission_denied_permanently_disables_the_microphone() {
        let (recognizer, events_rx) = ScriptedRecognizer::new();
        let begins = recognizer.begin_count();
        let mut controller =
            DictationController::new(Box::new(recognizer), events_rx, RecognizerConfig::default());

        controller.start_dictation();
        controller.handle_event(RecognitionEvent::Error(
            RecognitionErrorReason::PermissionDenied,
        ));

        assert_eq!(controller.state(), DictationState::Idle);
        assert!(!controller.mic_available());
        assert_eq!(
            controller.composer_text(),
            RecognitionErrorReason::PermissionDenied.user_message()
        );

        // A new start must report unavailability without attempting
        // activation.
        controller.start_dictation();
        assert_eq!(controller.state(), DictationState::Idle);
        assert_eq!(controller.composer_text(), MSG_UNAVAILABLE);
        assert_eq!(begins.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn no_speech_error_leaves_the_microphone_usable() {
        let mut controller = listening_controller();
        controller.handle_event(RecognitionEvent::Error(RecognitionErrorReason::NoSpeech));

        assert_eq!(controller.state(), DictationState::Idle);
        assert!(controller.mic_available());
        assert_eq!(
            controller.composer_text(),
            RecognitionErrorReason::NoSpeech.user_message()
        );
    }

    #[test]
    fn error_message_survives_the_trailing_end_event() {
        let mut controller = listening_controller();
        controller.handle_event(RecognitionEvent::Error(
            RecognitionErrorReason::CaptureUnavailable,
        ));
        controller.handle_event(RecognitionEvent::Ended);

        assert_eq!(
            controller.composer_text(),
            RecognitionErrorReason::CaptureUnavailable.user_message()
        );
        assert!(!controller.mic_available());
    }

    #[test]
    fn error_status_overwrites_typed_text() {
        let mut controller = listening_controller();
        controller.set_composer_text("draft I typed while listening");

        controller.handle_event(RecognitionEvent::Error(RecognitionErrorReason::Other));
        assert_eq!(
            controller.composer_text(),
            RecognitionErrorReason::Other.user_message()
        );
    }

    #[test]
    fn unsupported_capability_reports_without_activation() {
        let (recognizer, events_rx) = ScriptedRecognizer::new();
        let recognizer = recognizer.unsupported();
        let begins = recognizer.begin_count();
        let mut controller =
            DictationController::new(Box::new(recognizer), events_rx, RecognizerConfig::default());

        controller.start_dictation();

        assert_eq!(controller.state(), DictationState::Idle);
        assert!(!controller.mic_available());
        assert_eq!(controller.composer_text(), MSG_UNAVAILABLE);
        assert_eq!(begins.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn activation_failure_is_reported_and_disables_the_microphone() {
        let (recognizer, events_rx) = ScriptedRecognizer::new();
        let recognizer = recognizer.failing_begin();
        let mut controller =
            DictationController::new(Box::new(recognizer), events_rx, RecognizerConfig::default());

        controller.start_dictation();

        assert_eq!(controller.state(), DictationState::Idle);
        assert!(!controller.mic_available());
        assert_eq!(controller.composer_text(), MSG_ACTIVATION_FAILED);
        assert_eq!(
            controller.last_error(),
            Some(RecognitionErrorReason::Other)
        );
    }

    #[test]
    fn start_while_listening_is_a_no_op() {
        let (recognizer, events_rx) = ScriptedRecognizer::new();
        let begins = recognizer.begin_count();
        let mut controller =
            DictationController::new(Box::new(recognizer), events_rx, RecognizerConfig::default());

        controller.start_dictation();
        controller.start_dictation();

        assert_eq!(begins.load(Ordering::SeqCst), 1);
        assert_eq!(controller.state(), DictationState::Listening);
    }

    #[test]
    fn toggle_starts_then_stops() {
        let (recognizer, events_rx) = ScriptedRecognizer::new();
        let mut controller =
            DictationController::new(Box::new(recognizer), events_rx, RecognizerConfig::default());

        controller.toggle_dictation();
        assert!(controller.is_listening());

        controller.toggle_dictation();
        assert!(!controller.is_listening());
    }

    #[test]
    fn new_session_anchors_on_current_composer_text() {
        let mut controller = listening_controller();
        controller.handle_event(RecognitionEvent::Result(vec![TranscriptSegment::finalized(
            "first",
        )]));
        controller.stop_dictation();
        assert_eq!(controller.composer_text(), "first");

        controller.start_dictation();
        controller.handle_event(RecognitionEvent::Result(vec![TranscriptSegment::finalized(
            " second",
        )]));
        assert_eq!(controller.composer_text(), "first second");
    }

    #[test]
    fn every_text_mutation_raises_a_resize_request() {
        let mut controller = listening_controller();
        controller.take_resize_request();

        controller.set_composer_text("typed");
        assert!(controller.take_resize_request());
        assert!(!controller.take_resize_request());

        controller.handle_event(RecognitionEvent::Result(vec![TranscriptSegment::interim(
            "spoken",
        )]));
        assert!(controller.take_resize_request());

        controller.handle_event(RecognitionEvent::Ended);
        assert!(controller.take_resize_request());
    }

    #[test]
    fn drop_cancels_an_active_session() {
        let (recognizer, events_rx) = ScriptedRecognizer::new();
        let cancels = recognizer.cancel_count();
        let mut controller =
            DictationController::new(Box::new(recognizer), events_rx, RecognizerConfig::default());

        controller.start_dictation();
        drop(controller);

        assert_eq!(cancels.load(Ordering::SeqCst), 1);
    }
}
