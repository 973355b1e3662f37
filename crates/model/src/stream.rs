use std::pin::Pin;
use std::task::{self, Poll};

use crate::provider::TutorProviderError;

/// A lazy sequence of reply fragments from a streamed chat call.
pub trait TutorStream: Sized + Send + 'static {
    /// The error type that may be returned by the provider.
    type Error: TutorProviderError;

    /// Attempts to pull out the next text fragment from the stream.
    ///
    /// # Return value
    ///
    /// There are several possible return values, each indicating a
    /// distinct stream state:
    ///
    /// - `Poll::Pending` means that the stream is still waiting for the
    ///   next fragment. Implementations will ensure that the current
    ///   task will be notified when the next fragment may be ready.
    /// - `Poll::Ready(Ok(Some(fragment)))` means the stream has a
    ///   fragment to deliver, and may produce further fragments on
    ///   subsequent `poll_next_fragment` calls.
    /// - `Poll::Ready(Ok(None))` means the reply is complete.
    /// - `Poll::Ready(Err(error))` means an error occurred while
    ///   receiving the reply. Fragments delivered before the error must
    ///   be considered void by the caller.
    ///
    /// Calling this method after completion should always return `None`.
    fn poll_next_fragment(
        self: Pin<&mut Self>,
        cx: &mut task::Context<'_>,
    ) -> Poll<Result<Option<String>, Self::Error>>;
}
