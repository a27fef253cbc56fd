//! Line editing session: the dispatcher loop and its command sets.
//!
//! `LineEditor` owns one editing session. Each call to `read_line` runs the
//! dispatch loop until a line is accepted, the user interrupts, or input ends.
//! Keys come from a shared `KeyStream`; every mutation goes through the
//! session's `EditorState`.

pub mod dispatcher;
mod error;
mod overrides;

pub use dispatcher::LineEditor;
pub use error::ReadlineError;
pub use overrides::{OverrideHandler, OverrideResult};
