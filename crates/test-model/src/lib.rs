//! A local fake tutoring backend for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, ready};
use std::time::Duration;

use tokio::time::{Sleep, sleep};
use uba_tutor_model::{
    ChatRequest, ErrorKind, TutorProvider, TutorProviderError, TutorStream,
};

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    #[allow(dead_code)]
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(self, f)
    }
}

impl StdError for Error {}

impl TutorProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// A call this provider has received, kept for asserting the request
/// contract in tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedCall {
    /// A one-shot generation with the given prompt.
    Plan(String),
    /// A streamed chat call with the full request.
    Chat(ChatRequest),
}

#[derive(Clone)]
enum ScriptedCall {
    Plan(PresetPlan),
    Chat(PresetChat),
}

#[derive(Default)]
struct Shared {
    script: Mutex<VecDeque<ScriptedCall>>,
    recorded: Mutex<Vec<RecordedCall>>,
    delay: Mutex<Option<Duration>>,
}

/// A local fake tutoring backend for testing purpose.
///
/// Before issuing calls, you need to queue a preset for every call you
/// expect, in order. Each incoming call pops the front of the script; a
/// call with no matching preset (or a preset of the wrong kind) fails.
/// Every received call is also recorded, so tests can assert what was
/// actually sent over the boundary.
///
/// # Note
///
/// This type is not optimized for production use, there are heavy memory
/// copies involved. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestTutorProvider {
    shared: Arc<Shared>,
}

impl TestTutorProvider {
    /// Queues a preset for the next expected one-shot plan call.
    pub fn expect_plan(&self, preset: PresetPlan) {
        self.shared
            .script
            .lock()
            .unwrap()
            .push_back(ScriptedCall::Plan(preset));
    }

    /// Queues a preset for the next expected streamed chat call.
    pub fn expect_chat(&self, preset: PresetChat) {
        self.shared
            .script
            .lock()
            .unwrap()
            .push_back(ScriptedCall::Chat(preset));
    }

    /// Sets the artificial latency before each reply and between
    /// fragments. Defaults to 1 ms, which is enough to force a real
    /// suspension point.
    pub fn set_delay(&self, duration: Duration) {
        *self.shared.delay.lock().unwrap() = Some(duration);
    }

    /// Returns a copy of every call received so far, in order.
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.shared.recorded.lock().unwrap().clone()
    }

    fn delay(&self) -> Duration {
        self.shared
            .delay
            .lock()
            .unwrap()
            .unwrap_or(Duration::from_millis(1))
    }

    fn next_scripted(&self, call: RecordedCall) -> Option<ScriptedCall> {
        self.shared.recorded.lock().unwrap().push(call);
        self.shared.script.lock().unwrap().pop_front()
    }
}

impl TutorProvider for TestTutorProvider {
    type Error = Error;
    type Stream = TestTutorStream;

    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static
    {
        let scripted =
            self.next_scripted(RecordedCall::Plan(prompt.to_owned()));
        let delay = self.delay();
        async move {
            sleep(delay).await;
            match scripted {
                Some(ScriptedCall::Plan(preset)) => {
                    preset.reply.map_err(|kind| Error {
                        message: "scripted plan failure",
                        kind,
                    })
                }
                Some(ScriptedCall::Chat(_)) => Err(Error {
                    message: "script expected a chat call",
                    kind: ErrorKind::Api,
                }),
                None => Err(Error {
                    message: "script exhausted",
                    kind: ErrorKind::Api,
                }),
            }
        }
    }

    fn open_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static
    {
        let scripted = self.next_scripted(RecordedCall::Chat(req.clone()));
        let delay = self.delay();
        let result = match scripted {
            Some(ScriptedCall::Chat(preset)) => {
                if let Some(kind) = preset.refusal {
                    Err(Error {
                        message: "scripted chat refusal",
                        kind,
                    })
                } else {
                    Ok(TestTutorStream {
                        fragments: preset.fragments.into(),
                        fail_after: preset.fail_after,
                        delivered: 0,
                        delay,
                        sleep: None,
                        done: false,
                    })
                }
            }
            Some(ScriptedCall::Plan(_)) => Err(Error {
                message: "script expected a plan call",
                kind: ErrorKind::Api,
            }),
            None => Err(Error {
                message: "script exhausted",
                kind: ErrorKind::Api,
            }),
        };
        ready(result)
    }
}

pub struct TestTutorStream {
    fragments: VecDeque<String>,
    fail_after: Option<usize>,
    delivered: usize,
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
    done: bool,
}

impl TutorStream for TestTutorStream {
    type Error = Error;

    fn poll_next_fragment(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<String>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };

        // In case this method is called after completion.
        if this.done {
            return Poll::Ready(Ok(None));
        }

        if let Some(sleep) = &mut this.sleep {
            let sleep = sleep.as_mut();
            ready!(sleep.poll(cx));
            this.sleep = None;

            if this.fail_after == Some(this.delivered) {
                this.done = true;
                return Poll::Ready(Err(Error {
                    message: "scripted stream failure",
                    kind: ErrorKind::Network,
                }));
            }
            if let Some(fragment) = this.fragments.pop_front() {
                this.delivered += 1;
                return Poll::Ready(Ok(Some(fragment)));
            }
            this.done = true;
            return Poll::Ready(Ok(None));
        }
        this.sleep = Some(Box::pin(sleep(this.delay)));
        Pin::new(this).poll_next_fragment(cx)
    }
}
