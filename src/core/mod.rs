//! Core session components
//!
//! This module contains the conversation session manager: request building,
//! the session state machine, and the read model handed to presentation.

mod request;
mod session;

pub use request::DEFAULT_SYSTEM_PROMPT;
pub use session::{SessionController, SessionSnapshot, SubmitOutcome};
