use serde::{Deserialize, Serialize};
use uba_tutor_model::ErrorKind;

/// The scripted reply for a one-shot plan call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetPlan {
    /// The text to reply with, or the kind of failure to inject.
    pub reply: Result<String, ErrorKind>,
}

impl PresetPlan {
    /// Creates a preset that replies with the specified text.
    #[inline]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
        }
    }

    /// Creates a preset that fails with the specified error kind.
    #[inline]
    pub fn failure(kind: ErrorKind) -> Self {
        Self { reply: Err(kind) }
    }
}

/// The scripted reply for a streamed chat call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetChat {
    /// Fragments delivered in order.
    pub fragments: Vec<String>,
    /// If set, the call itself fails before any fragment is produced.
    pub refusal: Option<ErrorKind>,
    /// If set, the stream fails on the pull after this many fragments
    /// were delivered.
    pub fail_after: Option<usize>,
}

impl PresetChat {
    /// Creates a preset that streams the specified fragments.
    #[inline]
    pub fn with_fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            refusal: None,
            fail_after: None,
        }
    }

    /// Creates a preset whose call fails outright with the specified
    /// error kind.
    #[inline]
    pub fn refusing(kind: ErrorKind) -> Self {
        Self {
            fragments: vec![],
            refusal: Some(kind),
            fail_after: None,
        }
    }

    /// Makes the stream fail once `count` fragments have been delivered.
    #[inline]
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_deserialize() {
        let preset = PresetChat::with_fragments(["Hola, ", "¿qué tal?"])
            .failing_after(1);

        let serialized = serde_json::to_string(&preset).unwrap();
        let deserialized: PresetChat =
            serde_json::from_str(&serialized).unwrap();

        assert_eq!(preset, deserialized);
    }
}
