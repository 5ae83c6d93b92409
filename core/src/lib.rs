//! devsweep Core Library
//!
//! Terminates leftover development-server processes (and their children)
//! and frees the ports they held, so a dev workflow can restart cleanly.
//! Provides:
//! - Process lookup by exact name, command-line keywords or regex
//! - Process-tree termination with graceful-then-forceful escalation and verification
//! - Port-to-process resolution and port reclamation
//! - An ordered cleanup campaign with per-stage statistics
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure data models
//! - `ports`: Trait definitions (interfaces) for the OS
//! - `adapters`: OS-backed implementations and output parsers
//! - `application`: Selector, Terminator and the Campaign
//!
//! # Platform Support
//! - Linux: `ps`, `ss`, signals via `kill(2)`
//! - macOS: `ps`, `lsof`, signals via `kill(2)`
//! - Windows: `wmic`, `tasklist`, `netstat`, `taskkill`

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod error;
pub mod maintenance;
pub mod plan;
pub mod privilege;

#[cfg(test)]
pub(crate) mod testing;

// Re-export domain types (primary API)
pub use domain::{
    ConnectionRecord, KillOutcome, PortStatus, ProcessRecord, ProcessTree, Protocol, SweepStats,
};

// Re-export other commonly used types
pub use adapters::{SystemConnectionDirectory, SystemProcessDirectory, SystemSignaller};
pub use application::{
    Campaign, CampaignEvent, CampaignReport, Progress, Recommendation, Selector, Stage, Terminator,
};
pub use error::{Error, Result};
pub use plan::{CleanupPlan, PatternTarget, SettleDelays};
