use serde::{Deserialize, Serialize};

/// The party a chat message is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatRole {
    /// The student driving the conversation.
    Learner,
    /// The generative tutor.
    Tutor,
}

/// One prior message in a chat request.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who produced the message.
    pub role: ChatRole,
    /// The message text.
    pub text: String,
}

/// A streamed-chat request to be sent to the tutoring backend.
///
/// The history carries the turns that happened *before* the message being
/// sent; the new message itself goes in [`ChatRequest::message`] and must
/// not be duplicated into the history.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The persona instruction attached to every chat call.
    pub system_instruction: String,
    /// The prior conversation, in order.
    pub history: Vec<ChatMessage>,
    /// The new learner message.
    pub message: String,
}
