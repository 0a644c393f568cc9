//! Interactive picker controller.
//!
//! A [`Picker`] owns the configuration and the keymap. [`Picker::start`]
//! opens a [`Session`] that borrows the picker mutably, so at most one
//! session is live per picker.
//!
//! # Event loop
//!
//! ```text
//! loop {
//!     if let Some(input) = next_input() { session.feed(input); }
//!     session.tick();
//!     render(session.snapshot());
//!     if session.is_finished() { break; }
//! }
//! ```
//!
//! - `Session::feed()`: applies one input token, may start a match pass
//! - `Session::tick()`: resumes the in-flight pass for one time slice
//! - `Session::snapshot()`: read-only view for the renderer

mod action;
mod error;
mod keymap;
mod session;
mod snapshot;

pub use action::{Action, CustomAction, Input};
pub use error::{ActionError, SessionError};
pub use keymap::Keymap;
pub use session::{Picker, Selection, Session, SessionState};
pub use snapshot::Snapshot;
