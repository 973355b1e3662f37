//! Conversation-related types.

use serde::{Deserialize, Serialize};
use uba_tutor_model::ChatRole;

/// The party a turn is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    /// The student.
    Learner,
    /// The generative tutor.
    Tutor,
}

impl From<Speaker> for ChatRole {
    #[inline]
    fn from(speaker: Speaker) -> Self {
        match speaker {
            Speaker::Learner => ChatRole::Learner,
            Speaker::Tutor => ChatRole::Tutor,
        }
    }
}

/// One exchange unit in the conversation.
///
/// Turns only ever get appended; an existing turn is mutated solely
/// while it is the target of a streaming reply, and is sealed once that
/// reply settles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    speaker: Speaker,
    text: String,
}

impl Turn {
    pub(crate) fn learner(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Learner,
            text: text.into(),
        }
    }

    pub(crate) fn tutor(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Tutor,
            text: text.into(),
        }
    }

    /// Who produced this turn.
    #[inline]
    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    /// The turn text.
    ///
    /// For the tutor turn currently receiving a streamed reply this
    /// grows monotonically after every fragment.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub(crate) fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}
