//! The "Conectar UBA" assistant: an out-of-the-box tutoring session
//! wired to the Generative Language backend.
//!
//! The crate includes a CLI chat for using in the terminal. And you can
//! also use it as a library to bring the tutor into your own host apps.

#![deny(missing_docs)]

/// Re-exports of [`uba_tutor_core`] crate.
pub mod core {
    pub use uba_tutor_core::*;
}

/// Re-exports of [`uba_tutor_gemini_model`] crate.
pub mod gemini {
    pub use uba_tutor_gemini_model::*;
}

/// Re-exports of [`uba_tutor_model`] crate, for hosts that bring their
/// own provider.
pub mod model {
    pub use uba_tutor_model::*;
}
