use serde::{Deserialize, Serialize};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// No valid API credential is configured.
    CredentialMissing,
    /// The request could not reach the backend.
    Network,
    /// The backend rejected or failed the request.
    Api,
    /// The backend answered, but produced no usable text.
    EmptyResult,
}
