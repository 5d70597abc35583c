//! Speech recognition capability boundary
//!
//! The host platform's recognition capability is modelled as a trait with a
//! begin/cancel lifecycle plus a stream of discriminated events delivered
//! over a channel. The controller consumes the events; it never talks to the
//! capability through callbacks.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::{Deserialize, Serialize};
#[cfg(feature = "audio-io")]
use std::sync::atomic::AtomicBool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;
#[cfg(feature = "audio-io")]
use tracing::warn;

use crate::{DeskchatError, Result};

/// Session configuration requested when a dictation session starts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecognizerConfig {
    /// Whether the session spans multiple utterances or ends after one.
    pub continuous: bool,
    /// Whether provisional (interim) transcripts are reported.
    pub interim_results: bool,
    /// BCP-47 language tag for recognition.
    pub language: String,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            continuous: false,
            interim_results: true,
            language: "en-US".to_string(),
        }
    }
}

/// One recognized segment within a result event.
#[derive(Clone, Debug, PartialEq)]
pub struct TranscriptSegment {
    pub text: String,
    /// Final segments are settled; interim segments may still be revised.
    pub is_final: bool,
}

impl TranscriptSegment {
    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }

    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }
}

/// Reason codes reported by the recognition capability on failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognitionErrorReason {
    /// The session elapsed without detecting any speech.
    NoSpeech,
    /// No usable capture device was found.
    CaptureUnavailable,
    /// The user or platform denied microphone access.
    PermissionDenied,
    /// Any other recognition failure, including activation exceptions.
    Other,
}

impl RecognitionErrorReason {
    /// Whether this failure permanently disables the microphone for the
    /// rest of the application session.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            RecognitionErrorReason::CaptureUnavailable | RecognitionErrorReason::PermissionDenied
        )
    }

    /// Status text shown to the user in place of the composer contents.
    pub fn user_message(&self) -> &'static str {
        match self {
            RecognitionErrorReason::NoSpeech => "No speech detected. Please try again.",
            RecognitionErrorReason::CaptureUnavailable => {
                "Microphone not found. Please check your microphone."
            }
            RecognitionErrorReason::PermissionDenied => {
                "Microphone access denied. Please allow microphone access."
            }
            RecognitionErrorReason::Other => "Speech recognition error. Please try again.",
        }
    }
}

/// Events emitted by a recognition session, in order: `Started`, zero or
/// more `Result`s, then `Error` or nothing, then `Ended`.
#[derive(Clone, Debug, PartialEq)]
pub enum RecognitionEvent {
    Started,
    Result(Vec<TranscriptSegment>),
    Error(RecognitionErrorReason),
    Ended,
}

/// Host-provided speech recognition capability.
///
/// Implementations push `RecognitionEvent`s into the channel handed out at
/// construction. At most one session is active at a time; the caller
/// guarantees `begin` is not invoked while a session is running.
pub trait SpeechRecognizer: Send {
    /// Whether the capability is usable on this platform at all.
    fn is_supported(&self) -> bool;

    /// Request activation of a recognition session.
    fn begin(&mut self, config: &RecognizerConfig) -> Result<()>;

    /// Request cancellation of the active session, if any. Safe to call
    /// when no session is running.
    fn cancel(&mut self);
}

/// Scripted recognizer for tests and headless builds.
///
/// Events are injected through the handle returned by [`script`], exactly
/// as the host capability would deliver them.
///
/// [`script`]: ScriptedRecognizer::script
pub struct ScriptedRecognizer {
    events_tx: Sender<RecognitionEvent>,
    supported: bool,
    fail_begin: bool,
    begins: Arc<AtomicUsize>,
    cancels: Arc<AtomicUsize>,
}

impl ScriptedRecognizer {
    pub fn new() -> (Self, Receiver<RecognitionEvent>) {
        let (events_tx, events_rx) = unbounded();
        (
            Self {
                events_tx,
                supported: true,
                fail_begin: false,
                begins: Arc::new(AtomicUsize::new(0)),
                cancels: Arc::new(AtomicUsize::new(0)),
            },
            events_rx,
        )
    }

    /// Report the capability as missing on this platform.
    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    /// Make `begin` return an activation error.
    pub fn failing_begin(mut self) -> Self {
        self.fail_begin = true;
        self
    }

    /// Handle for injecting session events.
    pub fn script(&self) -> Sender<RecognitionEvent> {
        self.events_tx.clone()
    }

    /// Shared counter of `begin` calls.
    pub fn begin_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.begins)
    }

    /// Shared counter of `cancel` calls.
    pub fn cancel_count(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.cancels)
    }
}

impl SpeechRecognizer for ScriptedRecognizer {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn begin(&mut self, config: &RecognizerConfig) -> Result<()> {
        if self.fail_begin {
            return Err(DeskchatError::Recognition(
                "scripted activation failure".to_string(),
            ));
        }
        debug!(language = %config.language, "scripted recognition session requested");
        self.begins.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn cancel(&mut self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

/// Native recognizer backed by the platform audio stack.
///
/// Probes the default capture device through cpal to decide availability.
/// No transcription engine is wired up yet, so an activated session reports
/// no speech once its listening window elapses, mirroring how the host
/// capability self-terminates after silence.
#[cfg(feature = "audio-io")]
pub struct NativeRecognizer {
    events_tx: Sender<RecognitionEvent>,
    device_available: bool,
    cancel_flag: Arc<AtomicBool>,
}

#[cfg(feature = "audio-io")]
impl NativeRecognizer {
    /// Listening window before an engine-less session gives up.
    const SESSION_WINDOW_MS: u64 = 5000;

    pub fn probe() -> (Self, Receiver<RecognitionEvent>) {
        use cpal::traits::HostTrait;

        let device_available = cpal::default_host().default_input_device().is_some();
        if !device_available {
            warn!("no default capture device found; dictation disabled");
        }

        let (events_tx, events_rx) = unbounded();
        (
            Self {
                events_tx,
                device_available,
                cancel_flag: Arc::new(AtomicBool::new(false)),
            },
            events_rx,
        )
    }
}

#[cfg(feature = "audio-io")]
impl SpeechRecognizer for NativeRecognizer {
    fn is_supported(&self) -> bool {
        self.device_available
    }

    fn begin(&mut self, config: &RecognizerConfig) -> Result<()> {
        if !self.device_available {
            return Err(DeskchatError::CaptureDevice(
                "no default capture device".to_string(),
            ));
        }

        debug!(
            language = %config.language,
            interim = config.interim_results,
            "starting native recognition session"
        );

        let cancel_flag = Arc::new(AtomicBool::new(false));
        self.cancel_flag = Arc::clone(&cancel_flag);
        let events_tx = self.events_tx.clone();

        std::thread::spawn(move || {
            let _ = events_tx.send(RecognitionEvent::Started);

            let mut elapsed = 0u64;
            while elapsed < Self::SESSION_WINDOW_MS {
                if cancel_flag.load(Ordering::SeqCst) {
                    let _ = events_tx.send(RecognitionEvent::Ended);
                    return;
                }
                std::thread::sleep(std::time::Duration::from_millis(50));
                elapsed += 50;
            }

            let _ = events_tx.send(RecognitionEvent::Error(RecognitionErrorReason::NoSpeech));
            let _ = events_tx.send(RecognitionEvent::Ended);
        });

        Ok(())
    }

    fn cancel(&mut self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
    }
}

/// Recognizer used when the crate is built without audio support.
#[cfg(not(feature = "audio-io"))]
pub struct NullRecognizer;

#[cfg(not(feature = "audio-io"))]
impl NullRecognizer {
    pub fn probe() -> (Self, Receiver<RecognitionEvent>) {
        let (_tx, events_rx) = unbounded();
        (Self, events_rx)
    }
}

#[cfg(not(feature = "audio-io"))]
impl SpeechRecognizer for NullRecognizer {
    fn is_supported(&self) -> bool {
        false
    }

    fn begin(&mut self, _config: &RecognizerConfig) -> Result<()> {
        Err(DeskchatError::Recognition(
            "built without audio support".to_string(),
        ))
    }

    fn cancel(&mut self) {}
}

/// Default recognizer for the running application.
pub fn default_recognizer() -> (Box<dyn SpeechRecognizer>, Receiver<RecognitionEvent>) {
    #[cfg(feature = "audio-io")]
    {
        let (recognizer, events_rx) = NativeRecognizer::probe();
        (Box::new(recognizer), events_rx)
    }
    #[cfg(not(feature = "audio-io"))]
    {
        let (recognizer, events_rx) = NullRecognizer::probe();
        (Box::new(recognizer), events_rx)
    }
}
