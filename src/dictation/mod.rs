//! Voice dictation: the composer buffer controller and the recognition
//! capability boundary it consumes.

pub mod controller;
pub mod recognizer;

pub use controller::{DictationController, DictationState, OutboundMessage};
pub use recognizer::{
    default_recognizer, RecognitionErrorReason, RecognitionEvent, RecognizerConfig,
    ScriptedRecognizer, SpeechRecognizer, TranscriptSegment,
};
