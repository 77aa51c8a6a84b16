//! curator-session — the edit orchestration state machine.
//!
//! - [`session`] — [`EditSession`], the two-phase submit and polling loop
//! - [`mode`] — [`EditMode`] and its setter-validity table
//! - [`error`] — [`SessionError`]

pub mod error;
pub mod mode;
pub mod session;

pub use error::SessionError;
pub use mode::EditMode;
pub use session::{EditSession, SaveOutcome, SubmitResult, WaitOptions, WaitOutcome};
