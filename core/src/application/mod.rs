//! Application layer - the reclamation engine.
//!
//! - `Selector` turns names, keywords and patterns into target processes
//! - `Terminator` kills a process tree and verifies it is gone
//! - `Campaign` runs the ordered stages and accumulates statistics
//!
//! Everything here talks to the OS only through the traits in `ports`.

mod campaign;
mod progress;
mod report;
mod selector;
mod terminator;

pub use campaign::{Campaign, PortSweep};
pub use progress::{CampaignEvent, Progress, Silent, Stage};
pub use report::{CampaignReport, PortReport, Recommendation, StageReport};
pub use selector::Selector;
pub use terminator::Terminator;
