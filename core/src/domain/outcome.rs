//! Termination outcomes and sweep statistics.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

/// Result of one `terminate_tree` call against a root pid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillOutcome {
    pub pid: u32,

    /// Number of force-kill rounds issued before stopping.
    pub attempts: u32,

    /// Whether the root was verified gone.
    pub succeeded: bool,
}

/// Running counters for a sweep or the whole campaign.
///
/// One unit per distinct root pid an attempt was made against, never per
/// tree member, so `succeeded + failed == attempted` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepStats {
    pub attempted: u32,
    pub succeeded: u32,
    pub failed: u32,
}

impl SweepStats {
    /// Count one termination outcome.
    pub fn record(&mut self, outcome: &KillOutcome) {
        self.attempted += 1;
        if outcome.succeeded {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.succeeded + self.failed == self.attempted
    }
}

impl AddAssign for SweepStats {
    fn add_assign(&mut self, other: Self) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
    }
}

impl std::iter::Sum for SweepStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(SweepStats::default(), |mut acc, s| {
            acc += s;
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_merge() {
        let outcome = |pid, attempts, succeeded| KillOutcome {
            pid,
            attempts,
            succeeded,
        };

        let mut a = SweepStats::default();
        a.record(&outcome(1, 1, true));
        a.record(&outcome(2, 3, false));

        let mut b = SweepStats::default();
        b.record(&outcome(3, 1, true));

        let total: SweepStats = [a, b].into_iter().sum();
        assert_eq!(
            total,
            SweepStats {
                attempted: 3,
                succeeded: 2,
                failed: 1,
            }
        );
        assert!(total.is_consistent());
    }
}
