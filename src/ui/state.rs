//! Application state
//!
//! Ties the message log, the dictation controller, and the suggestion cards
//! together for the view layer.

use crate::config::AppConfig;
use crate::dictation::{
    default_recognizer, DictationController, RecognitionEvent, RecognizerConfig, SpeechRecognizer,
};
use crate::messages::{Message, MessageLog, Sender};
use crossbeam_channel::{unbounded, Receiver};
use tracing::debug;

/// Central application state
pub struct AppState {
    pub config: AppConfig,

    /// Conversation log, seeded with the greeting
    pub messages: MessageLog,

    /// Composer buffer and dictation session owner
    pub dictation: DictationController,

    /// One-shot request to focus the composer field (set by card selection)
    pub focus_composer: bool,

    outbound_rx: Receiver<crate::dictation::OutboundMessage>,
}

impl AppState {
    /// Create the state with the platform's default recognizer.
    pub fn new(config: AppConfig) -> Self {
        let (recognizer, events_rx) = default_recognizer();
        Self::with_recognizer(config, recognizer, events_rx)
    }

    /// Create the state with an explicit recognizer backend. Used by tests.
    pub fn with_recognizer(
        config: AppConfig,
        recognizer: Box<dyn SpeechRecognizer>,
        events_rx: Receiver<RecognitionEvent>,
    ) -> Self {
        let (outbound_tx, outbound_rx) = unbounded();

        let recognizer_config = RecognizerConfig {
            language: config.language.clone(),
            ..RecognizerConfig::default()
        };
        let dictation = DictationController::new(recognizer, events_rx, recognizer_config)
            .with_outbound(outbound_tx);

        let messages = MessageLog::new();
        messages.add(Message::new(Sender::Assistant, config.greeting.clone()));

        Self {
            config,
            messages,
            dictation,
            focus_composer: false,
            outbound_rx,
        }
    }

    /// Process pending events from the recognition backend and the outbound
    /// message channel. Called once per frame.
    pub fn poll_events(&mut self) {
        self.dictation.poll_events();
        self.drain_outbound();
    }

    /// Send the composer contents as a chat message.
    pub fn send_message(&mut self) {
        if self.dictation.submit().is_some() {
            self.drain_outbound();
        }
    }

    /// Populate the composer from a suggestion card, replacing whatever it
    /// held, and focus it.
    pub fn select_suggestion(&mut self, index: usize) {
        if let Some(card) = self.config.suggestions.get(index) {
            debug!(label = %card.label, "suggestion card selected");
            self.dictation.set_composer_text(card.prompt());
            self.focus_composer = true;
        }
    }

    fn drain_outbound(&mut self) {
        while let Ok(outbound) = self.outbound_rx.try_recv() {
            self.messages.add(Message::new(Sender::User, outbound.text));
        }
    }
}
