//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with the OS. Implementations live in `adapters`; tests
//! substitute an in-memory process table.

mod connections;
mod killer;
mod processes;

pub use connections::ConnectionDirectory;
pub use killer::ProcessSignaller;
pub use processes::ProcessDirectory;
