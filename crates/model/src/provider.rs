use std::error::Error;

use crate::error::ErrorKind;
use crate::request::ChatRequest;
use crate::stream::TutorStream;

/// The error type for a tutoring provider.
pub trait TutorProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents a tutoring provider, which is an entry for the
/// two calls the assistant session makes: one-shot generation and
/// streamed chat.
///
/// Once the provider is created, it should behave like a stateless
/// object. It can still have internal state, but callers should not rely
/// on it, and the provider should be prepared for being dropped anytime.
/// A provider makes exactly one attempt per call; retrying is not its
/// concern, nor the caller's.
pub trait TutorProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: TutorProviderError;

    /// The fragment stream type for this provider's chat calls.
    type Stream: TutorStream<Error = Self::Error>;

    /// Requests a single complete text for the given prompt.
    ///
    /// The future resolves once the whole result is available; nothing
    /// is streamed.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'static;

    /// Opens a streamed chat exchange.
    ///
    /// On success the returned stream yields the reply as an ordered
    /// sequence of text fragments. The stream is finite and cannot be
    /// restarted; it may also fail at any pull.
    fn open_chat(
        &self,
        req: &ChatRequest,
    ) -> impl Future<Output = Result<Self::Stream, Self::Error>> + Send + 'static;
}
