//! Domain layer - Pure data models.
//!
//! These types have no I/O dependencies and can be tested in isolation.
//! Every record is a point-in-time snapshot and is never mutated after creation.

mod connection;
mod outcome;
mod process;

pub use connection::{
    owning_pids, port_is_held, split_port, ConnectionRecord, PortStatus, Protocol,
};
pub use outcome::{KillOutcome, SweepStats};
pub use process::{ProcessRecord, ProcessTree};
