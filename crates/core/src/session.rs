mod builder;
mod state;

use std::sync::{Arc, Mutex, MutexGuard};

use uba_tutor_model::ChatRequest;

use crate::conversation::Turn;
use crate::prompts::SessionPrompts;
use crate::tutor_client::TutorClient;
pub use builder::SessionBuilder;
pub use state::Phase;
use state::SessionState;

/// The signal returned by session operations.
///
/// None of these is an error: a rejected or blank submission leaves the
/// conversation untouched, and the caller may keep the typed input and
/// submit again once the session is no longer pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The exchange ran to completion and a tutor turn was appended
    /// (the apology turn when the backend failed).
    Settled,
    /// A request was already outstanding; nothing happened.
    NotReady,
    /// The message was blank after trimming; nothing happened.
    EmptyMessage,
}

pub(crate) type UpdateFn = Box<dyn Fn(&[Turn], bool) + Send + Sync>;

struct SessionShared {
    state: Mutex<SessionState>,
    prompts: SessionPrompts,
    client: TutorClient,
    on_update: Option<UpdateFn>,
}

impl SessionShared {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state lock poisoned")
    }

    fn notify(&self, state: &SessionState) {
        if let Some(on_update) = &self.on_update {
            on_update(&state.turns, state.phase.is_pending());
        }
    }

    /// Runs `mutate` on the state, then reports the new observable
    /// state to the update callback.
    ///
    /// The callback runs while the state is borrowed: it must copy what
    /// it needs and return, without calling back into the session.
    fn mutate<R>(&self, mutate: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.state();
        let result = mutate(&mut state);
        self.notify(&state);
        result
    }

    /// Like [`Self::mutate`], for operations that may decline to touch
    /// the state. The update callback only fires when they did not.
    fn try_mutate<R>(
        &self,
        mutate: impl FnOnce(&mut SessionState) -> Option<R>,
    ) -> Option<R> {
        let mut state = self.state();
        let result = mutate(&mut state);
        if result.is_some() {
            self.notify(&state);
        }
        result
    }
}

/// A tutoring conversation: the ordered turns plus the lifecycle of the
/// single outstanding external request.
///
/// The session is a cheap cloneable handle; clones observe and mutate
/// the same conversation. Internal state is mutated only between
/// suspension points and its lock is never held across one, so a host
/// driving the session on a single-threaded runtime observes every
/// intermediate streaming state, in order.
///
/// Sessions are ephemeral. Drop the handle when the assistant surface
/// closes and open a fresh one next time; there is no cross-session
/// memory. Dropping does not cancel an in-flight request; its eventual
/// result mutates state that nothing renders any more.
#[derive(Clone)]
pub struct Session {
    shared: Arc<SessionShared>,
}

impl Session {
    fn open_from_builder(builder: SessionBuilder) -> Self {
        let SessionBuilder {
            client,
            prompts,
            focus_topic,
            on_update,
        } = builder;

        let shared = Arc::new(SessionShared {
            state: Mutex::new(SessionState::seeded(&prompts.greeting)),
            prompts,
            client,
            on_update,
        });
        let session = Self { shared };
        debug!("session opened");

        if let Some(topic) = focus_topic {
            // The busy phase must be entered before `open` returns, so
            // that a submission racing the spawned request observes it
            // and is rejected.
            if session.stage_plan(&topic) {
                let session = session.clone();
                tokio::spawn(async move {
                    session.finish_plan(&topic).await;
                });
            }
        }

        session
    }

    /// A snapshot of the conversation turns, in order.
    pub fn turns(&self) -> Vec<Turn> {
        self.shared.state().turns.clone()
    }

    /// The current request-lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.shared.state().phase
    }

    /// Whether an external request is outstanding. While this is true,
    /// new submissions are rejected.
    pub fn pending(&self) -> bool {
        self.phase().is_pending()
    }

    /// Requests a study plan for `topic`, as a full conversation
    /// exchange: a synthesized learner turn followed by one tutor turn
    /// with the plan.
    ///
    /// The busy phase is entered before the first suspension point of
    /// the returned future, so a second operation polled in the same
    /// tick observes it and is rejected. A failure of any kind settles
    /// as the apology turn; the conversation log is the error channel.
    pub async fn request_plan(&self, topic: &str) -> RequestOutcome {
        if !self.stage_plan(topic) {
            debug!("plan request rejected: session is pending");
            return RequestOutcome::NotReady;
        }
        self.finish_plan(topic).await;
        RequestOutcome::Settled
    }

    fn stage_plan(&self, topic: &str) -> bool {
        let request_text = self.shared.prompts.render_plan_request(topic);
        self.shared
            .try_mutate(|state| state.stage_plan(request_text).then_some(()))
            .is_some()
    }

    async fn finish_plan(&self, topic: &str) {
        let instruction =
            self.shared.prompts.render_plan_instruction(topic);
        let reply = match self.shared.client.generate(instruction).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("plan request produced no text");
                self.shared.prompts.apology.clone()
            }
            Err(err) => {
                warn!("plan request failed: {err}");
                self.shared.prompts.apology.clone()
            }
        };
        self.shared.mutate(|state| state.settle_plan(reply));
    }

    /// Sends a learner message and streams the tutor reply into the
    /// conversation.
    ///
    /// The message is trimmed first. Blank messages and messages
    /// submitted while a request is outstanding are rejected without
    /// touching the conversation; see [`RequestOutcome`]. The busy
    /// phase is entered before the first suspension point of the
    /// returned future.
    pub async fn send(&self, message: &str) -> RequestOutcome {
        let message = message.trim();
        if message.is_empty() {
            return RequestOutcome::EmptyMessage;
        }
        let Some((open_turn, history)) =
            self.shared.try_mutate(|state| state.stage_chat(message))
        else {
            debug!("message rejected: session is pending");
            return RequestOutcome::NotReady;
        };

        let req = ChatRequest {
            system_instruction: self
                .shared
                .prompts
                .system_instruction
                .clone(),
            history,
            message: message.to_owned(),
        };
        let result = self
            .shared
            .client
            .chat(req, {
                let shared = Arc::clone(&self.shared);
                move |text| {
                    shared.mutate(|state| state.apply_text(open_turn, text));
                }
            })
            .await;

        let failure_text = match result {
            Ok(_) => None,
            Err(err) => {
                warn!("chat exchange failed: {err}");
                Some(self.shared.prompts.apology.clone())
            }
        };
        self.shared.mutate(|state| {
            state.settle_chat(open_turn, failure_text.as_deref())
        });
        RequestOutcome::Settled
    }
}
