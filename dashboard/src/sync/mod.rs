//! The synchronization core: one push stream fanned out to local listeners,
//! one periodic poller per data domain, one mutating command.
//!
//! Ownership: the host process owns the [`session::StreamSession`] and the
//! pollers; display surfaces only hold fan-out subscriptions and issue
//! start/stop through the bridge. Nothing here retries implicitly: a dead
//! stream stays dead until a caller restarts it, a failed tick waits for the
//! next cadence.

pub mod actions;
pub mod domains;
pub mod fanout;
pub mod poller;
pub mod session;
