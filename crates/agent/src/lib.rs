//! Assistant runtime: hosts conversation sessions on top of the
//! `gestor-core` dispatcher.
//!
//! Every session owns its own flow slot and suggestion set. The runtime
//! guarantees that a session processes one input at a time (a concurrent
//! submission gets `RuntimeError::Busy`) and that a clicked suggestion is
//! only accepted while the suggestion set it came from is still current.

pub mod conversation;
pub mod runtime;

pub use conversation::{Input, SessionId, TurnReport};
pub use runtime::{AssistantRuntime, RuntimeError};
