//! Event dispatch and logging for guild chat bots.
//!
//! The session manager owning the gateway connection hands every received
//! frame to a [`event::Dispatcher`], which decodes it and calls the callback
//! registered for its event category.

pub mod config;
pub mod event;
pub mod log;
pub mod replay;

pub use guildbot_protocol as protocol;
