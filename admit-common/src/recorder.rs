//! Voice exercise recorder state machine
//!
//! ```text
//! idle --start--> recording --stop--> recorded --submit--> transcribing
//!   transcribing --transcribed--> getting-feedback --feedback_ready--> complete
//!   transcribing | getting-feedback --failed--> recorded
//!   any --reset--> idle
//! ```
//!
//! The server-side voice pipeline drives this machine from `recorded`; the
//! browser recorder follows the same table.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
    Recorded,
    Transcribing,
    GettingFeedback,
    Complete,
}

impl RecordingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordingState::Idle => "idle",
            RecordingState::Recording => "recording",
            RecordingState::Recorded => "recorded",
            RecordingState::Transcribing => "transcribing",
            RecordingState::GettingFeedback => "getting-feedback",
            RecordingState::Complete => "complete",
        }
    }

    /// True while a request is outstanding and the UI should show a spinner
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            RecordingState::Transcribing | RecordingState::GettingFeedback
        )
    }

    /// Next state for `event`, or an error when the event is not allowed here
    pub fn apply(self, event: RecorderEvent) -> Result<RecordingState, TransitionError> {
        use RecorderEvent as E;
        use RecordingState as S;

        let next = match (self, event) {
            (_, E::Reset) => S::Idle,
            (S::Idle, E::Start) => S::Recording,
            (S::Recording, E::Stop) => S::Recorded,
            (S::Recorded, E::Submit) => S::Transcribing,
            (S::Transcribing, E::Transcribed) => S::GettingFeedback,
            (S::GettingFeedback, E::FeedbackReady) => S::Complete,
            (S::Transcribing | S::GettingFeedback, E::Failed) => S::Recorded,
            (from, event) => return Err(TransitionError { from, event }),
        };

        Ok(next)
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecorderEvent {
    Start,
    Stop,
    Submit,
    Transcribed,
    FeedbackReady,
    Failed,
    Reset,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Invalid recorder transition: {event:?} while {from}")]
pub struct TransitionError {
    pub from: RecordingState,
    pub event: RecorderEvent,
}
