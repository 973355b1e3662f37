use std::future::poll_fn;
use std::pin::{Pin, pin};
use std::sync::Arc;

use tracing::Instrument;
use uba_tutor_model::{
    ChatRequest, TutorProvider, TutorProviderError, TutorStream,
};

type CallResult = Result<String, Box<dyn TutorProviderError>>;
type BoxedCallFuture = Pin<Box<dyn Future<Output = CallResult> + Send>>;
type OnTextFn = Box<dyn Fn(&str) + Send + 'static>;
#[rustfmt::skip]
type GenerateFn = Arc<
    dyn Fn(String) -> BoxedCallFuture + Send + Sync
>;
#[rustfmt::skip]
type ChatFn = Arc<
    dyn Fn(ChatRequest, OnTextFn) -> BoxedCallFuture + Send + Sync
>;

/// A wrapper around a tutoring provider that maintains an execution
/// environment for the provider and provides a type-erased interface
/// for the session.
#[derive(Clone)]
pub struct TutorClient {
    generate_fn: GenerateFn,
    chat_fn: ChatFn,
}

impl TutorClient {
    /// Wraps the given provider.
    #[inline]
    pub fn new<P: TutorProvider + 'static>(provider: P) -> Self {
        // We have to erase the type `P`, since `TutorClient` doesn't
        // have a generic parameter and we don't want it either.
        let provider = Arc::new(provider);
        let generate_fn: GenerateFn = Arc::new({
            let provider = Arc::clone(&provider);
            move |prompt| {
                let fut = provider.generate(&prompt);
                Box::pin(
                    async move {
                        trace!("requesting one-shot generation");
                        fut.await.map_err(|err| {
                            error!("got an error: {err:?}");
                            Box::new(err) as Box<dyn TutorProviderError>
                        })
                    }
                    .instrument(trace_span!("tutor client generate")),
                )
            }
        });
        let chat_fn: ChatFn = Arc::new(move |req, on_text| {
            let fut = provider.open_chat(&req);
            Box::pin(
                async move {
                    trace!("got a chat request: {req:?}");
                    let stream = match fut.await {
                        Ok(stream) => stream,
                        Err(err) => {
                            error!("got an error: {err:?}");
                            return Err(Box::new(err)
                                as Box<dyn TutorProviderError>);
                        }
                    };
                    pump_stream(stream, on_text).await
                }
                .instrument(trace_span!("tutor client chat")),
            )
        });
        Self {
            generate_fn,
            chat_fn,
        }
    }

    /// Requests a single complete text for the given prompt.
    #[inline]
    pub async fn generate(&self, prompt: String) -> CallResult {
        (self.generate_fn)(prompt).await
    }

    /// Runs a streamed chat exchange to completion.
    ///
    /// `on_text` is invoked after every received fragment with the text
    /// accumulated so far, which grows monotonically; the final
    /// accumulated text is also the return value.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. The exchange stops pulling further
    /// fragments when this operation is cancelled.
    #[inline]
    pub async fn chat(
        &self,
        req: ChatRequest,
        on_text: impl Fn(&str) + Send + 'static,
    ) -> CallResult {
        (self.chat_fn)(req, Box::new(on_text)).await
    }
}

async fn pump_stream<S: TutorStream>(
    stream: S,
    on_text: OnTextFn,
) -> CallResult {
    let mut text = String::new();

    trace!("start receiving fragments");

    let mut pinned_stream = pin!(stream);
    loop {
        let fragment_or_err =
            poll_fn(|cx| pinned_stream.as_mut().poll_next_fragment(cx)).await;
        let fragment = match fragment_or_err {
            Ok(fragment) => fragment,
            Err(err) => {
                error!("got an error: {err:?}");
                return Err(Box::new(err));
            }
        };

        let Some(fragment) = fragment else {
            break;
        };
        trace!("got a fragment: {fragment:?}");

        text.push_str(&fragment);
        on_text(&text);
    }

    trace!("finished a chat exchange");

    Ok(text)
}
