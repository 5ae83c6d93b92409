//! Campaign results.

use serde::{Deserialize, Serialize};

use crate::domain::{PortStatus, SweepStats};

use super::progress::Stage;

/// Counters for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    pub stats: SweepStats,
}

/// Occupancy of one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortReport {
    pub port: u16,
    pub status: PortStatus,
}

/// What the operator should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Recommendation {
    /// Critical ports are clear and nothing failed.
    AllClear,
    /// Something survived; more privilege may help.
    ElevationSuggested,
    /// No failures, but a critical port is still taken by something.
    Done,
}

impl Recommendation {
    pub fn message(self) -> &'static str {
        match self {
            Recommendation::AllClear => {
                "All processes cleaned up and ports released. Safe to run: pnpm dev"
            }
            Recommendation::ElevationSuggested => {
                "Some processes could not be terminated. Try again as administrator/root."
            }
            Recommendation::Done => "Cleanup finished. You can now run: pnpm dev",
        }
    }
}

/// Final result of a full campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignReport {
    pub stages: Vec<StageReport>,
    pub ports: Vec<PortReport>,
    pub critical_ports: Vec<PortReport>,
    pub totals: SweepStats,
    pub recommendation: Recommendation,
}

impl CampaignReport {
    pub fn new(
        stages: Vec<StageReport>,
        ports: Vec<PortReport>,
        critical_ports: Vec<PortReport>,
    ) -> Self {
        let totals: SweepStats = stages.iter().map(|s| s.stats).sum();
        let all_clear = critical_ports.iter().all(|p| p.status.is_clear());

        let recommendation = if all_clear && totals.failed == 0 {
            Recommendation::AllClear
        } else if totals.failed > 0 {
            Recommendation::ElevationSuggested
        } else {
            Recommendation::Done
        };

        Self {
            stages,
            ports,
            critical_ports,
            totals,
            recommendation,
        }
    }

    /// Whether every critical port ended up free.
    pub fn critical_ports_clear(&self) -> bool {
        self.critical_ports.iter().all(|p| p.status.is_clear())
    }
}
