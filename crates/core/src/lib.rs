//! Core logic of the assistant session: conversation turns, the single
//! outstanding-request lifecycle, and the type-erased tutoring client.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

pub mod conversation;
mod prompts;
mod session;
mod tutor_client;

pub use prompts::{SessionPrompts, TOPIC_PLACEHOLDER};
pub use session::{Phase, RequestOutcome, Session, SessionBuilder};
pub use tutor_client::TutorClient;
