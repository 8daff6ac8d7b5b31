//! Command sources
//!
//! Two symmetric producers of commands against the session controller:
//! a local interactive prompt over stdin and a remote listener on the
//! bus control topic. Neither source owns any session state; both
//! translate their events into the same controller calls.

pub mod local;
pub mod remote;
