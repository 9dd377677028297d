//! Recorder session state machine

use std::fmt;

/// Recorder phases surfaced to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecorderPhase {
    #[default]
    Idle,
    Listening,
    Processing,
    Complete,
    Error,
}

impl RecorderPhase {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Processing => "processing",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for RecorderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of the session state for rendering: the phase plus a primary
/// message and a secondary detail line. Always populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderStatus {
    pub phase: RecorderPhase,
    pub message: String,
    pub detail: String,
}

/// Recorder session entity.
///
/// State machine:
///   IDLE | COMPLETE | ERROR -> LISTENING  (try_start)
///   LISTENING -> PROCESSING               (try_stop)
///   PROCESSING -> COMPLETE                (complete)
///   any -> ERROR                          (fail)
///
/// `try_start` while LISTENING or PROCESSING is a no-op, which is what
/// enforces single-session exclusivity; no other locking is required.
#[derive(Debug)]
pub struct RecorderSession {
    phase: RecorderPhase,
    message: String,
    detail: String,
}

impl RecorderSession {
    /// Create a new session in the idle state
    pub fn new() -> Self {
        Self {
            phase: RecorderPhase::Idle,
            message: "Voice assistant ready".to_string(),
            detail: "Start a recording to begin".to_string(),
        }
    }

    /// Get the current phase
    pub fn phase(&self) -> RecorderPhase {
        self.phase
    }

    /// Snapshot the current status for the presentation layer
    pub fn status(&self) -> RecorderStatus {
        RecorderStatus {
            phase: self.phase,
            message: self.message.clone(),
            detail: self.detail.clone(),
        }
    }

    /// Begin listening.
    ///
    /// Returns `false` (and changes nothing) when a session is already
    /// listening or processing; starting over from COMPLETE or ERROR is
    /// always legal.
    pub fn try_start(&mut self) -> bool {
        if matches!(
            self.phase,
            RecorderPhase::Listening | RecorderPhase::Processing
        ) {
            return false;
        }
        self.phase = RecorderPhase::Listening;
        self.message = "Listening...".to_string();
        self.detail = "Speak now. Stop the recording when you are done.".to_string();
        true
    }

    /// Move from LISTENING to PROCESSING.
    ///
    /// Returns `false` when not currently listening.
    pub fn try_stop(&mut self) -> bool {
        if self.phase != RecorderPhase::Listening {
            return false;
        }
        self.phase = RecorderPhase::Processing;
        self.message = "Processing...".to_string();
        self.detail = "Transcoding and uploading your recording".to_string();
        true
    }

    /// Mark the session complete with a result detail (e.g. the recognized
    /// speech text)
    pub fn complete(&mut self, detail: impl Into<String>) {
        self.phase = RecorderPhase::Complete;
        self.message = "Done".to_string();
        self.detail = detail.into();
    }

    /// Mark the session failed. Legal from any phase; the user can start a
    /// new recording immediately afterwards.
    pub fn fail(&mut self, message: impl Into<String>, detail: impl Into<String>) {
        self.phase = RecorderPhase::Error;
        self.message = message.into();
        self.detail = detail.into();
    }
}

impl Default for RecorderSession {
    fn default() -> Self {
        Self::new()
    }
}
