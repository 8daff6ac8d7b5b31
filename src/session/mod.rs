//! Session control
//!
//! This module provides the `SessionController`, the single owner of
//! mutable session state:
//! - the recording slot (at most one live capture process)
//! - the volume monitor handle (at most one running loop)
//! - the remote-attached and closed flags
//!
//! Every command source drives the same controller surface, and each
//! state axis is linearized behind its own lock.

mod controller;
mod state;

pub use controller::{ControllerSettings, SessionController};
pub use state::{RecordOutcome, SessionSnapshot, StopOutcome, ToggleAction};
