//! REPL and CLI for strata.
//!
//! This crate provides:
//! - [`Session`] - A store, a rule set and a reasoner wired together
//! - [`Repl`] - Interactive read-eval-print loop over a session
//! - [`Command`] - The `:command` language of the REPL

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod command;
pub mod editor;
pub mod highlight;
pub mod repl;
pub mod session;

pub use command::{Command, TraceCommand};
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::{Repl, Reply};
pub use session::{Loaded, RunSummary, Session, DEFAULT_BASE_GRAPH};
