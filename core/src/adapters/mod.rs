//! Adapters layer - OS-backed implementations.
//!
//! This module contains implementations of the port traits defined in `ports`.
//! Raw tool output is turned into domain records in `parse`.

mod command;
pub mod connections;
pub mod killer;
pub mod parse;
pub mod processes;

// Re-export main types for convenience
pub use connections::SystemConnectionDirectory;
pub use killer::SystemSignaller;
pub use processes::SystemProcessDirectory;

#[cfg(windows)]
pub(crate) use command::succeeds as command_succeeds;
