//! An abstraction layer for the external tutoring API.
//!
//! This crate establishes an unified protocol for the assistant session
//! to talk to a generative tutoring backend, so that the session can be
//! driven by the real remote API or by a local scripted fake without
//! modifying the core codebase.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to. A provider offers
//! exactly two calls: a one-shot text generation, and a streamed chat
//! that yields an ordered, finite sequence of text fragments.

#![deny(missing_docs)]

mod error;
mod provider;
mod request;
mod stream;

pub use error::*;
pub use provider::*;
pub use request::*;
pub use stream::*;
