use std::pin::Pin;
use std::task::{Context, Poll, ready};

use pin_project_lite::pin_project;
use uba_tutor_model::{ErrorKind, TutorStream};

use crate::Error;
use crate::proto::GenerateContentResponse;
use crate::sse::EventReader;

type PinnedFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type NextFragment = Result<(Option<String>, EventReader), Error>;

pin_project! {
    /// The fragment sequence of one `streamGenerateContent` call.
    pub struct GeminiChatStream {
        next_fragment_fut: Option<PinnedFuture<NextFragment>>,
    }
}

impl GeminiChatStream {
    #[inline]
    pub(crate) fn new(events: EventReader) -> Self {
        Self {
            next_fragment_fut: Some(Box::pin(next_fragment(events))),
        }
    }
}

impl TutorStream for GeminiChatStream {
    type Error = Error;

    fn poll_next_fragment(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<Option<String>, Self::Error>> {
        let this = self.project();
        let Some(next_fragment_fut) = this.next_fragment_fut else {
            // The stream has been exhausted (or has failed).
            return Poll::Ready(Ok(None));
        };
        match ready!(next_fragment_fut.as_mut().poll(cx)) {
            Ok((Some(fragment), events)) => {
                // There may be more events to pull, re-arm for the next
                // fragment.
                *this.next_fragment_fut =
                    Some(Box::pin(next_fragment(events)));
                Poll::Ready(Ok(Some(fragment)))
            }
            Ok((None, _)) => {
                *this.next_fragment_fut = None;
                Poll::Ready(Ok(None))
            }
            Err(err) => {
                *this.next_fragment_fut = None;
                Poll::Ready(Err(err))
            }
        }
    }
}

async fn next_fragment(mut events: EventReader) -> NextFragment {
    loop {
        let payload = match events.next_event().await {
            Ok(Some(payload)) => payload,
            Ok(None) => return Ok((None, events)),
            Err(err) => return Err(Error::from_sse(err)),
        };
        trace!("got sse event: {payload}");

        let chunk =
            serde_json::from_str::<GenerateContentResponse>(&payload)
                .map_err(|err| {
                    Error::new(format!("{err}"), ErrorKind::Api)
                })?;

        // Chunks without candidate text (e.g. the trailing one carrying
        // only usage metadata) are skipped.
        let text = chunk.text();
        if !text.is_empty() {
            return Ok((Some(text), events));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::poll_fn;
    use std::pin::pin;

    use bytes::Bytes;
    use uba_tutor_model::TutorProviderError;

    use super::*;
    use crate::sse::ByteSource;

    fn stream(chunks: Vec<Bytes>) -> GeminiChatStream {
        GeminiChatStream::new(EventReader::new(ByteSource::from_chunks(
            chunks.into(),
        )))
    }

    fn chunk_payload(text: &str) -> Bytes {
        let payload = serde_json::json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] }
            }]
        });
        Bytes::from(format!("data: {payload}\n\n"))
    }

    #[tokio::test]
    async fn test_fragments_in_order() {
        let mut stream = pin!(stream(vec![
            chunk_payload("Hola, "),
            chunk_payload("¿en qué te ayudo?"),
            // A textless chunk, like the trailing usage metadata one.
            Bytes::from_static(b"data: {\"usageMetadata\": {}}\n\n"),
        ]));

        let mut fragments = Vec::new();
        loop {
            let fragment =
                poll_fn(|cx| stream.as_mut().poll_next_fragment(cx))
                    .await
                    .unwrap();
            let Some(fragment) = fragment else {
                break;
            };
            fragments.push(fragment);
        }
        assert_eq!(fragments, ["Hola, ", "¿en qué te ayudo?"]);

        // Pulling after completion keeps returning `None`.
        let fragment = poll_fn(|cx| stream.as_mut().poll_next_fragment(cx))
            .await
            .unwrap();
        assert_eq!(fragment, None);
    }

    #[tokio::test]
    async fn test_malformed_payload() {
        let mut stream =
            pin!(stream(vec![Bytes::from_static(b"data: not-json\n\n")]));
        let err = poll_fn(|cx| stream.as_mut().poll_next_fragment(cx))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Api);
    }
}
