use uba_tutor_model::TutorProvider;

use super::{Session, UpdateFn};
use crate::conversation::Turn;
use crate::prompts::SessionPrompts;
use crate::tutor_client::TutorClient;

/// [`Session`] builder.
pub struct SessionBuilder {
    pub(crate) client: TutorClient,
    pub(crate) prompts: SessionPrompts,
    pub(crate) focus_topic: Option<String>,
    pub(crate) on_update: Option<UpdateFn>,
}

impl SessionBuilder {
    /// Creates a new builder with the specified tutoring provider.
    #[inline]
    pub fn with_provider<P: TutorProvider + 'static>(provider: P) -> Self {
        Self {
            client: TutorClient::new(provider),
            prompts: SessionPrompts::default(),
            focus_topic: None,
            on_update: None,
        }
    }

    /// Replaces the default prompt set.
    #[inline]
    pub fn with_prompts(mut self, prompts: SessionPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Sets the course this session is opened for. Opening then
    /// triggers an automatic study-plan exchange before any learner
    /// submission is accepted.
    #[inline]
    pub fn with_focus_topic<S: Into<String>>(mut self, topic: S) -> Self {
        self.focus_topic = Some(topic.into());
        self
    }

    /// Attaches a callback invoked after every observable mutation with
    /// the current turns and whether a request is outstanding.
    ///
    /// The callback must copy what it needs and return; it must not
    /// call back into the session.
    #[inline]
    pub fn on_update(
        mut self,
        on_update: impl Fn(&[Turn], bool) + Send + Sync + 'static,
    ) -> Self {
        self.on_update = Some(Box::new(on_update));
        self
    }

    /// Opens the session, seeding the tutor greeting turn.
    ///
    /// When a focus topic is set this must be called within a Tokio
    /// runtime, since the automatic plan request is spawned on it.
    #[inline]
    pub fn open(self) -> Session {
        Session::open_from_builder(self)
    }
}
