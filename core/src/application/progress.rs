//! Progress events emitted while the campaign runs.

use serde::{Deserialize, Serialize};

use crate::domain::PortStatus;

/// The campaign's ordered stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    TargetApps,
    RuntimeHost,
    DevTools,
    Patterns,
    Ports,
    Verification,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 6] = [
        Stage::TargetApps,
        Stage::RuntimeHost,
        Stage::DevTools,
        Stage::Patterns,
        Stage::Ports,
        Stage::Verification,
    ];

    pub fn number(self) -> usize {
        match self {
            Stage::TargetApps => 0,
            Stage::RuntimeHost => 1,
            Stage::DevTools => 2,
            Stage::Patterns => 3,
            Stage::Ports => 4,
            Stage::Verification => 5,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Stage::TargetApps => "Target application processes",
            Stage::RuntimeHost => "Runtime host processes",
            Stage::DevTools => "Dev tool processes",
            Stage::Patterns => "Command-line pattern matches",
            Stage::Ports => "Port reclamation",
            Stage::Verification => "Final verification",
        }
    }
}

/// Something worth telling the operator about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignEvent {
    StageStarted(Stage),

    /// Looking up a process name or pattern label.
    LookupStarted { target: String },
    NothingFound { target: String },
    MatchesFound { count: usize },

    /// About to terminate a selected process; `command` is display-truncated.
    Terminating { pid: u32, command: String },
    /// About to terminate the owner of a port.
    TerminatingPortOwner { pid: u32, name: String, connections: usize },
    Terminated { pid: u32 },
    TerminationFailed { pid: u32, attempts: u32 },

    /// A selected process is the sweep itself or one of its ancestors.
    SkippedOwnProcess { pid: u32 },

    /// A pattern that does not compile; the stage moves on.
    PatternSkipped { label: String, reason: String },

    PortCheckStarted { port: u16 },
    PortOwnersFound { port: u16, owners: usize },
    /// The port is bound but the OS does not say by whom.
    PortOwnersHidden { port: u16 },
    /// Occupancy after a port sweep, or at final verification.
    PortStatus { port: u16, status: PortStatus },
}

/// Receives campaign events as they happen.
pub trait Progress {
    fn event(&mut self, event: CampaignEvent);
}

/// Collects events in order.
impl Progress for Vec<CampaignEvent> {
    fn event(&mut self, event: CampaignEvent) {
        self.push(event);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Progress for Silent {
    fn event(&mut self, _event: CampaignEvent) {}
}
