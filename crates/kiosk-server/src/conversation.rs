//! Conversation state of the current kiosk visit.

use kiosk_types::{ConversationTurn, Mode};

/// Mode, transcript and the last processed audio capture.
///
/// The transcript is append-only while a mode is active. Entering a mode
/// starts a fresh transcript; leaving it discards the transcript.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    mode: Option<Mode>,
    transcript: Vec<ConversationTurn>,
    last_capture_id: Option<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    pub fn transcript(&self) -> &[ConversationTurn] {
        &self.transcript
    }

    pub fn enter_mode(&mut self, mode: Mode) {
        self.mode = Some(mode);
        self.transcript.clear();
    }

    pub fn exit_mode(&mut self) {
        self.mode = None;
        self.transcript.clear();
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.transcript.push(turn);
    }

    /// Records `capture_id` as processed.
    ///
    /// Returns `false` when it matches the previous capture, in which case
    /// the audio must not be handled again.
    pub fn accept_capture(&mut self, capture_id: &str) -> bool {
        if self.last_capture_id.as_deref() == Some(capture_id) {
            return false;
        }
        self.last_capture_id = Some(capture_id.to_string());
        true
    }
}
