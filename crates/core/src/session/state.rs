use uba_tutor_model::ChatMessage;

use crate::conversation::Turn;

/// The request-lifecycle state of a session.
///
/// `Idle` is the only state that accepts a new operation; both busy
/// variants are what callers observe as "pending". The turn receiving a
/// streamed reply is addressed through the handle stored in the phase,
/// never by its position in the conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No external request is outstanding.
    Idle,
    /// A one-shot plan request is outstanding.
    AwaitingPlan,
    /// A chat stream is open.
    Streaming {
        /// Handle of the placeholder tutor turn receiving fragments.
        open_turn: usize,
    },
}

impl Phase {
    /// Whether an external request is outstanding.
    #[inline]
    pub fn is_pending(self) -> bool {
        self != Phase::Idle
    }
}

pub(super) struct SessionState {
    pub(super) turns: Vec<Turn>,
    pub(super) phase: Phase,
}

impl SessionState {
    pub fn seeded(greeting: &str) -> Self {
        Self {
            turns: vec![Turn::tutor(greeting)],
            phase: Phase::Idle,
        }
    }

    /// Appends the learner turn of a plan exchange and marks the
    /// session busy. Returns `false` without touching anything when a
    /// request is already outstanding.
    pub fn stage_plan(&mut self, request_text: String) -> bool {
        if self.phase.is_pending() {
            return false;
        }
        self.turns.push(Turn::learner(request_text));
        self.phase = Phase::AwaitingPlan;
        true
    }

    /// Appends one tutor turn with the plan text (or the apology) and
    /// returns the session to idle.
    pub fn settle_plan(&mut self, text: String) {
        debug_assert_eq!(self.phase, Phase::AwaitingPlan);
        self.turns.push(Turn::tutor(text));
        self.phase = Phase::Idle;
    }

    /// Appends the learner turn and the placeholder tutor turn of a
    /// chat exchange and marks the session busy, returning the open
    /// turn handle and the prior history. The history is captured
    /// before the appends, so it excludes both new turns. Returns
    /// `None` without touching anything when a request is already
    /// outstanding.
    pub fn stage_chat(
        &mut self,
        message: &str,
    ) -> Option<(usize, Vec<ChatMessage>)> {
        if self.phase.is_pending() {
            return None;
        }
        let history = self
            .turns
            .iter()
            .map(|turn| ChatMessage {
                role: turn.speaker().into(),
                text: turn.text().to_owned(),
            })
            .collect();
        self.turns.push(Turn::learner(message));
        let open_turn = self.turns.len();
        self.turns.push(Turn::tutor(""));
        self.phase = Phase::Streaming { open_turn };
        Some((open_turn, history))
    }

    /// Replaces the open turn's text with the reply accumulated so far.
    pub fn apply_text(&mut self, open_turn: usize, text: &str) {
        debug_assert_eq!(self.phase, Phase::Streaming { open_turn });
        self.turns[open_turn].set_text(text);
    }

    /// Seals the open turn and returns the session to idle. On failure
    /// any partial content that already arrived is replaced by the
    /// apology text.
    pub fn settle_chat(&mut self, open_turn: usize, failure_text: Option<&str>) {
        debug_assert_eq!(self.phase, Phase::Streaming { open_turn });
        if let Some(text) = failure_text {
            self.turns[open_turn].set_text(text);
        }
        self.phase = Phase::Idle;
    }
}
