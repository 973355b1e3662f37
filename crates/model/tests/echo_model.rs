use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::pin::Pin;
use std::task::{self, Poll, ready};
use std::time::Duration;

use tokio::time::{Sleep, sleep};
use uba_tutor_model::{
    ChatRequest, ErrorKind, TutorProvider, TutorProviderError, TutorStream,
};

#[derive(Debug)]
struct EchoTutorError(ErrorKind);

impl Display for EchoTutorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for EchoTutorError {}

impl TutorProviderError for EchoTutorError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

#[derive(Debug)]
struct EchoTutorStream {
    fragments: VecDeque<String>,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl EchoTutorStream {
    fn new(message: &str) -> Self {
        let fragments = format!("Dijiste: {message}")
            .split(" ")
            .map(ToString::to_string)
            .collect();
        Self {
            fragments,
            sleep: None,
        }
    }
}

impl TutorStream for EchoTutorStream {
    type Error = EchoTutorError;

    fn poll_next_fragment(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<String>, Self::Error>> {
        // SAFETY: This type does not require to be pinned.
        let this = unsafe { self.get_unchecked_mut() };
        if let Some(sleep) = &mut this.sleep {
            let sleep = sleep.as_mut();
            ready!(sleep.poll(cx));
            this.sleep = None;

            if let Some(mut fragment) = this.fragments.pop_front() {
                let need_space = !this.fragments.is_empty();
                if need_space {
                    fragment.push(' ');
                }
                return Poll::Ready(Ok(Some(fragment)));
            }

            return Poll::Ready(Ok(None));
        }
        this.sleep = Some(Box::pin(sleep(Duration::from_millis(1))));
        Pin::new(this).poll_next_fragment(cx)
    }
}

struct EchoTutorProvider;

impl TutorProvider for EchoTutorProvider {
    type Error = EchoTutorError;
    type Stream = EchoTutorStream;

    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static
    {
        let result = if prompt.is_empty() {
            Err(EchoTutorError(ErrorKind::EmptyResult))
        } else {
            Ok(format!("Plan: {prompt}"))
        };
        ready(result)
    }

    fn open_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static
    {
        let result = if req.message.is_empty() {
            Err(EchoTutorError(ErrorKind::Api))
        } else {
            Ok(EchoTutorStream::new(&req.message))
        };
        ready(result)
    }
}

mod tests {
    use std::future::poll_fn;

    use super::*;

    fn chat_request(message: &str) -> ChatRequest {
        ChatRequest {
            system_instruction: "Sos un tutor.".to_string(),
            history: vec![],
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_streamed_chat() {
        let provider = EchoTutorProvider;
        let mut stream = provider
            .open_chat(&chat_request("Buen día"))
            .await
            .unwrap();

        let mut reply = String::new();
        loop {
            let fragment_fut =
                poll_fn(|cx| Pin::new(&mut stream).poll_next_fragment(cx));
            match fragment_fut.await {
                Ok(Some(fragment)) => reply.push_str(&fragment),
                Ok(None) => break,
                Err(err) => unreachable!("unexpected error: {err:?}"),
            }
        }

        assert_eq!(reply, "Dijiste: Buen día");
    }

    #[tokio::test]
    async fn test_one_shot_generation() {
        let provider = EchoTutorProvider;
        let text = provider.generate("Análisis Matemático I").await.unwrap();
        assert_eq!(text, "Plan: Análisis Matemático I");
    }

    #[tokio::test]
    async fn test_error_kinds() {
        let provider = EchoTutorProvider;

        let err = provider.generate("").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyResult);

        let err = provider.open_chat(&chat_request("")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Api);
    }
}
