//! The ordered cleanup campaign.
//!
//! Stages run strictly in order and each one is independent: a stage that
//! sees nothing, or whose queries fail, hands an empty result to the next
//! stage instead of aborting. Every stage returns its own `SweepStats`;
//! the final report sums them.

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::domain::{
    owning_pids, port_is_held, ConnectionRecord, PortStatus, ProcessRecord, SweepStats,
};
use crate::plan::{settle, CleanupPlan, PatternTarget};
use crate::ports::{ConnectionDirectory, ProcessDirectory, ProcessSignaller};

use super::progress::{CampaignEvent, Progress, Stage};
use super::report::{CampaignReport, PortReport, StageReport};
use super::selector::Selector;
use super::terminator::Terminator;

/// Width command lines are cut to in progress output.
const COMMAND_DISPLAY_WIDTH: usize = 80;

/// Outcome of reclaiming one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSweep {
    pub stats: SweepStats,
    pub status: PortStatus,
}

/// Runs the cleanup stages against a process table, connection table and signaller.
///
/// The sweeping process and its ancestors are never terminated, so a sweep
/// started from a package-manager script does not take itself down.
pub struct Campaign<'a, P, C, S> {
    processes: &'a P,
    connections: &'a C,
    signaller: &'a S,
    plan: CleanupPlan,
    own_pid: u32,
    protected: OnceLock<Vec<u32>>,
}

impl<'a, P, C, S> Campaign<'a, P, C, S>
where
    P: ProcessDirectory,
    C: ConnectionDirectory,
    S: ProcessSignaller,
{
    pub fn new(processes: &'a P, connections: &'a C, signaller: &'a S, plan: CleanupPlan) -> Self {
        Self {
            processes,
            connections,
            signaller,
            plan,
            own_pid: std::process::id(),
            protected: OnceLock::new(),
        }
    }

    /// Treat `pid` as the sweeping process instead of the current one.
    pub fn with_own_pid(mut self, pid: u32) -> Self {
        self.own_pid = pid;
        self.protected = OnceLock::new();
        self
    }

    fn terminator(&self) -> Terminator<'a, P, S> {
        Terminator::new(self.processes, self.signaller, self.plan.delays)
    }

    fn selector(&self) -> Selector<'a, P> {
        Selector::new(self.processes)
    }

    /// Run every stage in order and build the final report.
    pub async fn run(&self, progress: &mut impl Progress) -> CampaignReport {
        let mut stages = Vec::with_capacity(Stage::ALL.len() - 1);

        progress.event(CampaignEvent::StageStarted(Stage::TargetApps));
        let stats = self.sweep_names(&self.plan.target_apps, progress).await;
        stages.push(StageReport {
            stage: Stage::TargetApps,
            stats,
        });

        progress.event(CampaignEvent::StageStarted(Stage::RuntimeHost));
        let stats = self.sweep_runtime_host(progress).await;
        stages.push(StageReport {
            stage: Stage::RuntimeHost,
            stats,
        });

        progress.event(CampaignEvent::StageStarted(Stage::DevTools));
        let stats = self.sweep_names(&self.plan.dev_tools, progress).await;
        stages.push(StageReport {
            stage: Stage::DevTools,
            stats,
        });

        progress.event(CampaignEvent::StageStarted(Stage::Patterns));
        let stats = self.sweep_patterns(progress).await;
        stages.push(StageReport {
            stage: Stage::Patterns,
            stats,
        });

        progress.event(CampaignEvent::StageStarted(Stage::Ports));
        let (stats, ports) = self.sweep_ports(progress).await;
        stages.push(StageReport {
            stage: Stage::Ports,
            stats,
        });

        progress.event(CampaignEvent::StageStarted(Stage::Verification));
        settle(self.plan.delays.final_verification).await;
        let critical_ports = self.verify_critical_ports(progress).await;

        CampaignReport::new(stages, ports, critical_ports)
    }

    /// Stages 0 and 2: terminate every process with one of `names`.
    pub async fn sweep_names(&self, names: &[String], progress: &mut impl Progress) -> SweepStats {
        let mut stats = SweepStats::default();
        for name in names {
            stats += self.kill_by_name(name, &[], progress).await;
            settle(self.plan.delays.between_targets).await;
        }
        stats
    }

    /// Stage 1: terminate runtime-host processes that look like dev tooling.
    pub async fn sweep_runtime_host(&self, progress: &mut impl Progress) -> SweepStats {
        if self.plan.runtime_host.is_empty() {
            return SweepStats::default();
        }
        self.kill_by_name(&self.plan.runtime_host, &self.plan.runtime_keywords, progress)
            .await
    }

    /// Stage 3: terminate processes matching each command-line pattern.
    pub async fn sweep_patterns(&self, progress: &mut impl Progress) -> SweepStats {
        let mut stats = SweepStats::default();
        for target in &self.plan.patterns {
            stats += self.kill_by_pattern(target, progress).await;
            settle(self.plan.delays.between_targets).await;
        }
        stats
    }

    /// Stage 4: reclaim every configured port.
    pub async fn sweep_ports(&self, progress: &mut impl Progress) -> (SweepStats, Vec<PortReport>) {
        let mut stats = SweepStats::default();
        let mut reports = Vec::with_capacity(self.plan.ports.len());

        for &port in &self.plan.ports {
            let sweep = self.kill_by_port(port, progress).await;
            stats += sweep.stats;
            reports.push(PortReport {
                port,
                status: sweep.status,
            });
            settle(self.plan.delays.between_targets).await;
        }

        (stats, reports)
    }

    /// Stage 5: report whether the critical ports are free now.
    pub async fn verify_critical_ports(&self, progress: &mut impl Progress) -> Vec<PortReport> {
        let mut reports = Vec::with_capacity(self.plan.critical_ports.len());
        for &port in &self.plan.critical_ports {
            let status = self.check_port(port).await;
            progress.event(CampaignEvent::PortStatus { port, status });
            reports.push(PortReport { port, status });
        }
        reports
    }

    /// Terminate processes named `name`, optionally filtered by command-line keywords.
    pub async fn kill_by_name(
        &self,
        name: &str,
        keywords: &[String],
        progress: &mut impl Progress,
    ) -> SweepStats {
        progress.event(CampaignEvent::LookupStarted {
            target: name.to_string(),
        });

        let targets = self.selector().by_name(name, keywords).await;
        self.terminate_selected(name, &targets, progress).await
    }

    /// Terminate processes whose command line matches `target`.
    pub async fn kill_by_pattern(
        &self,
        target: &PatternTarget,
        progress: &mut impl Progress,
    ) -> SweepStats {
        progress.event(CampaignEvent::LookupStarted {
            target: target.label.clone(),
        });

        let regex = match target.compile() {
            Ok(regex) => regex,
            Err(e) => {
                warn!(pattern = %target.pattern, error = %e, "Skipping invalid pattern");
                progress.event(CampaignEvent::PatternSkipped {
                    label: target.label.clone(),
                    reason: e.to_string(),
                });
                return SweepStats::default();
            }
        };

        let targets = self.selector().by_pattern(&regex).await;
        self.terminate_selected(&target.label, &targets, progress).await
    }

    async fn terminate_selected(
        &self,
        label: &str,
        targets: &[ProcessRecord],
        progress: &mut impl Progress,
    ) -> SweepStats {
        let mut stats = SweepStats::default();
        if targets.is_empty() {
            progress.event(CampaignEvent::NothingFound {
                target: label.to_string(),
            });
            return stats;
        }

        progress.event(CampaignEvent::MatchesFound {
            count: targets.len(),
        });

        let protected = self.protected_pids().await;
        let terminator = self.terminator();
        for target in targets {
            if protected.contains(&target.pid) {
                progress.event(CampaignEvent::SkippedOwnProcess { pid: target.pid });
                continue;
            }

            progress.event(CampaignEvent::Terminating {
                pid: target.pid,
                command: target.display_command(COMMAND_DISPLAY_WIDTH),
            });

            let outcome = terminator
                .terminate_tree(target.pid, self.plan.max_attempts)
                .await;
            stats.record(&outcome);
            progress.event(outcome_event(outcome.pid, outcome.succeeded, outcome.attempts));
        }

        stats
    }

    /// Terminate every process holding `port`, then re-check it once.
    ///
    /// Each owning pid gets exactly one termination, however many sockets
    /// it holds. The re-check only reports; it never retries. A port whose
    /// owner the OS hides is reported occupied without any termination.
    pub async fn kill_by_port(&self, port: u16, progress: &mut impl Progress) -> PortSweep {
        progress.event(CampaignEvent::PortCheckStarted { port });

        let records = self.port_connections(port).await;
        if !port_is_held(&records) {
            return port_swept(port, SweepStats::default(), PortStatus::Free, progress);
        }

        let owners = owning_pids(&records);
        if owners.is_empty() {
            warn!(port = port, "Port is held by a process that is not visible");
            progress.event(CampaignEvent::PortOwnersHidden { port });
            return port_swept(
                port,
                SweepStats::default(),
                PortStatus::StillOccupied,
                progress,
            );
        }

        progress.event(CampaignEvent::PortOwnersFound {
            port,
            owners: owners.len(),
        });

        let protected = self.protected_pids().await;
        let terminator = self.terminator();
        let mut stats = SweepStats::default();
        for pid in owners {
            if protected.contains(&pid) {
                progress.event(CampaignEvent::SkippedOwnProcess { pid });
                continue;
            }

            let connections = records
                .iter()
                .filter(|r| r.owning_pid == Some(pid))
                .count();
            progress.event(CampaignEvent::TerminatingPortOwner {
                pid,
                name: self.process_name(pid).await,
                connections,
            });

            let outcome = terminator
                .terminate_tree(pid, self.plan.port_max_attempts)
                .await;
            stats.record(&outcome);
            progress.event(outcome_event(outcome.pid, outcome.succeeded, outcome.attempts));

            settle(self.plan.delays.after_port_kill).await;
        }

        settle(self.plan.delays.port_recheck).await;
        let status = if port_is_held(&self.port_connections(port).await) {
            PortStatus::StillOccupied
        } else {
            PortStatus::Released
        };
        port_swept(port, stats, status, progress)
    }

    /// Current occupancy of `port`, without touching its owners.
    pub async fn check_port(&self, port: u16) -> PortStatus {
        if port_is_held(&self.port_connections(port).await) {
            PortStatus::StillOccupied
        } else {
            PortStatus::Free
        }
    }

    /// The sweeping process and its ancestors, nearest first.
    ///
    /// Resolved from one snapshot and kept for the rest of the campaign.
    /// When the snapshot fails only the sweeping process itself is known.
    async fn protected_pids(&self) -> Vec<u32> {
        if let Some(pids) = self.protected.get() {
            return pids.clone();
        }

        let table = match self.processes.find_all().await {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "Cannot resolve own ancestry");
                return vec![self.own_pid];
            }
        };

        let parents: HashMap<u32, u32> = table
            .iter()
            .filter_map(|p| p.parent_pid.map(|parent| (p.pid, parent)))
            .collect();

        let mut chain = vec![self.own_pid];
        let mut current = self.own_pid;
        while let Some(&parent) = parents.get(&current) {
            if chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        debug!(pids = ?chain, "Protected own process chain");

        self.protected.get_or_init(|| chain).clone()
    }

    async fn port_connections(&self, port: u16) -> Vec<ConnectionRecord> {
        match self.connections.find_by_port(port).await {
            Ok(records) => records,
            Err(e) => {
                warn!(port = port, error = %e, "Connection lookup failed");
                Vec::new()
            }
        }
    }

    async fn process_name(&self, pid: u32) -> String {
        match self.processes.describe(pid).await {
            Ok(Some(record)) => record.name,
            Ok(None) => "unknown".to_string(),
            Err(e) => {
                debug!(pid = pid, error = %e, "Process describe failed");
                "unknown".to_string()
            }
        }
    }
}

fn port_swept(
    port: u16,
    stats: SweepStats,
    status: PortStatus,
    progress: &mut impl Progress,
) -> PortSweep {
    progress.event(CampaignEvent::PortStatus { port, status });
    PortSweep { stats, status }
}

fn outcome_event(pid: u32, succeeded: bool, attempts: u32) -> CampaignEvent {
    if succeeded {
        CampaignEvent::Terminated { pid }
    } else {
        CampaignEvent::TerminationFailed { pid, attempts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::SettleDelays;
    use crate::testing::FakeSystem;

    /// Pid of the sweeping process in fake tables; absent unless a test adds it.
    const OWN_PID: u32 = 4_000_000;

    fn quick_plan() -> CleanupPlan {
        CleanupPlan::empty().with_delays(SettleDelays::none())
    }

    fn campaign<'a>(
        fake: &'a FakeSystem,
        plan: CleanupPlan,
    ) -> Campaign<'a, FakeSystem, FakeSystem, FakeSystem> {
        Campaign::new(fake, fake, fake, plan).with_own_pid(OWN_PID)
    }

    #[tokio::test]
    async fn test_kill_by_name_with_keywords_kills_tree() {
        let fake = FakeSystem::new()
            .with_process(100, "node.exe", "node vite dev --port 5173", None)
            .with_process(101, "esbuild.exe", "esbuild --service", Some(100))
            .with_process(200, "node.exe", "node language-server.js", None);

        let mut events = Vec::new();
        let stats = campaign(&fake, quick_plan())
            .kill_by_name("node.exe", &["vite".to_string()], &mut events)
            .await;

        assert_eq!(
            stats,
            SweepStats {
                attempted: 1,
                succeeded: 1,
                failed: 0,
            }
        );
        assert!(!fake.is_alive(100));
        assert!(!fake.is_alive(101));
        assert!(fake.is_alive(200));
        assert!(events.contains(&CampaignEvent::Terminated { pid: 100 }));
    }

    #[tokio::test]
    async fn test_kill_by_name_nothing_found() {
        let fake = FakeSystem::new();
        let mut events = Vec::new();
        let stats = campaign(&fake, quick_plan())
            .kill_by_name("mihomo", &[], &mut events)
            .await;

        assert_eq!(stats, SweepStats::default());
        assert_eq!(
            events,
            vec![
                CampaignEvent::LookupStarted {
                    target: "mihomo".to_string()
                },
                CampaignEvent::NothingFound {
                    target: "mihomo".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_free_port_makes_no_attempts() {
        let fake = FakeSystem::new().with_process(1, "init", "init", None);
        let mut events = Vec::new();
        let sweep = campaign(&fake, quick_plan()).kill_by_port(5173, &mut events).await;

        assert_eq!(sweep.stats.attempted, 0);
        assert_eq!(sweep.status, PortStatus::Free);
        assert!(fake.signals().is_empty());
        assert!(events.contains(&CampaignEvent::PortStatus {
            port: 5173,
            status: PortStatus::Free
        }));
    }

    #[tokio::test]
    async fn test_port_sweep_dedupes_owners() {
        let fake = FakeSystem::new()
            .with_process(555, "java", "java -jar server.jar", None)
            .with_listener(8080, 555)
            .with_listener(8080, 555);

        let mut events = Vec::new();
        let sweep = campaign(&fake, quick_plan()).kill_by_port(8080, &mut events).await;

        assert_eq!(sweep.stats.attempted, 1);
        assert_eq!(fake.graceful_roots(), vec![555]);
        assert_eq!(sweep.status, PortStatus::Released);
        assert!(events.contains(&CampaignEvent::TerminatingPortOwner {
            pid: 555,
            name: "java".to_string(),
            connections: 2,
        }));
    }

    #[tokio::test]
    async fn test_port_still_occupied_is_reported_not_retried() {
        let fake = FakeSystem::new()
            .with_process(77, "svc", "svc", None)
            .with_listener(9000, 77)
            .with_unkillable(77);

        let mut events = Vec::new();
        let plan = quick_plan().with_attempts(3, 5);
        let sweep = campaign(&fake, plan).kill_by_port(9000, &mut events).await;

        assert_eq!(sweep.status, PortStatus::StillOccupied);
        assert_eq!(
            sweep.stats,
            SweepStats {
                attempted: 1,
                succeeded: 0,
                failed: 1,
            }
        );
        assert_eq!(fake.force_count(77), 5);
        assert_eq!(fake.graceful_count(), 1);
        assert!(events.contains(&CampaignEvent::TerminationFailed {
            pid: 77,
            attempts: 5
        }));
    }

    #[tokio::test]
    async fn test_unknown_port_owner_name() {
        // Socket owner not visible in the process table
        let fake = FakeSystem::new().with_listener(3000, 4321);
        let mut events = Vec::new();
        campaign(&fake, quick_plan()).kill_by_port(3000, &mut events).await;

        assert!(events.contains(&CampaignEvent::TerminatingPortOwner {
            pid: 4321,
            name: "unknown".to_string(),
            connections: 1,
        }));
    }

    #[tokio::test]
    async fn test_hidden_owner_keeps_port_occupied() {
        let fake = FakeSystem::new().with_hidden_listener(5173);
        let mut events = Vec::new();
        let campaign = campaign(&fake, quick_plan());
        let sweep = campaign.kill_by_port(5173, &mut events).await;

        assert_eq!(sweep.status, PortStatus::StillOccupied);
        assert_eq!(sweep.stats, SweepStats::default());
        assert!(fake.signals().is_empty());
        assert!(events.contains(&CampaignEvent::PortOwnersHidden { port: 5173 }));
        assert_eq!(campaign.check_port(5173).await, PortStatus::StillOccupied);
    }

    #[tokio::test]
    async fn test_hidden_listener_blocks_all_clear() {
        let fake = FakeSystem::new()
            .with_process(100, "node", "node vite", None)
            .with_listener(5173, 100)
            .with_hidden_listener(5173);

        let plan = quick_plan().with_ports(vec![5173], vec![5173]);
        let report = campaign(&fake, plan)
            .run(&mut crate::application::Silent)
            .await;

        assert!(!fake.is_alive(100));
        assert_eq!(report.ports[0].status, PortStatus::StillOccupied);
        assert!(!report.critical_ports_clear());
        assert_ne!(
            report.recommendation,
            crate::application::Recommendation::AllClear
        );
    }

    #[tokio::test]
    async fn test_own_process_chain_is_never_terminated() {
        // pnpm (50) -> node script (60) -> the sweep itself
        let fake = FakeSystem::new()
            .with_process(50, "node", "node /usr/bin/pnpm run clean", None)
            .with_process(60, "node", "node scripts/clean.js", Some(50))
            .with_process(OWN_PID, "devsweep", "devsweep", Some(60))
            .with_process(70, "node", "node vite dev", None)
            .with_listener(3000, 60);

        let plan = quick_plan().with_runtime_host("node", ["pnpm", "vite", "clean"]);
        let mut events = Vec::new();
        let campaign = campaign(&fake, plan);
        let stats = campaign.sweep_runtime_host(&mut events).await;

        assert_eq!(stats.attempted, 1);
        assert!(fake.is_alive(50));
        assert!(fake.is_alive(60));
        assert!(fake.is_alive(OWN_PID));
        assert!(!fake.is_alive(70));
        assert!(events.contains(&CampaignEvent::SkippedOwnProcess { pid: 50 }));
        assert!(events.contains(&CampaignEvent::SkippedOwnProcess { pid: 60 }));

        let sweep = campaign.kill_by_port(3000, &mut events).await;
        assert_eq!(sweep.stats.attempted, 0);
        assert_eq!(sweep.status, PortStatus::StillOccupied);
        assert!(fake.is_alive(60));
    }

    #[tokio::test]
    async fn test_invalid_pattern_is_skipped() {
        let fake = FakeSystem::new().with_process(1, "node", "webpack dev server", None);
        let plan = quick_plan().with_patterns(vec![
            PatternTarget::new("webpack(", "Broken"),
            PatternTarget::new(r"webpack.*dev.*server", "Webpack dev server"),
        ]);

        let mut events = Vec::new();
        let stats = campaign(&fake, plan).sweep_patterns(&mut events).await;

        assert_eq!(stats.attempted, 1);
        assert!(!fake.is_alive(1));
        assert!(events.iter().any(|e| matches!(
            e,
            CampaignEvent::PatternSkipped { label, .. } if label == "Broken"
        )));
    }

    #[tokio::test]
    async fn test_unkillable_counts_one_failure() {
        let fake = FakeSystem::new()
            .with_process(900, "vite", "vite", None)
            .with_unkillable(900);

        let mut events = Vec::new();
        let stats = campaign(&fake, quick_plan())
            .kill_by_name("vite", &[], &mut events)
            .await;

        assert_eq!(stats.failed, 1);
        assert_eq!(stats.attempted, 1);
        assert!(stats.is_consistent());
    }

    #[tokio::test]
    async fn test_full_run_order_and_totals() {
        let fake = FakeSystem::new()
            .with_process(10, "clash-verge", "clash-verge", None)
            .with_process(100, "node", "node vite dev --port 5173", None)
            .with_process(101, "esbuild", "esbuild --service", Some(100))
            .with_process(200, "pnpm", "pnpm dev", None)
            .with_process(300, "cargo", "cargo tauri dev", None)
            .with_process(555, "python", "python -m http.server 8080", None)
            .with_process(666, "stuck", "stuck", None)
            .with_listener(5173, 100)
            .with_listener(8080, 555)
            .with_listener(8080, 555)
            .with_listener(1420, 666)
            .with_unkillable(666);

        let plan = quick_plan()
            .with_target_apps(["clash-verge"])
            .with_runtime_host("node", ["vite", "tauri"])
            .with_dev_tools(["pnpm", "yarn"])
            .with_patterns(vec![PatternTarget::new(r"tauri.*dev", "Tauri dev server")])
            .with_ports(vec![1420, 5173, 8080], vec![1420, 5173]);

        let mut events = Vec::new();
        let report = campaign(&fake, plan).run(&mut events).await;

        let stage_order: Vec<Stage> = events
            .iter()
            .filter_map(|e| match e {
                CampaignEvent::StageStarted(stage) => Some(*stage),
                _ => None,
            })
            .collect();
        assert_eq!(stage_order, Stage::ALL.to_vec());

        // clash-verge, node 100, pnpm, cargo, then 666 (fails) and 555 on ports
        assert_eq!(report.totals.attempted, 6);
        assert_eq!(report.totals.failed, 1);
        assert!(report.totals.is_consistent());
        assert_eq!(fake.graceful_roots(), vec![10, 100, 200, 300, 666, 555]);

        assert_eq!(
            report.ports,
            vec![
                PortReport {
                    port: 1420,
                    status: PortStatus::StillOccupied,
                },
                PortReport {
                    port: 5173,
                    status: PortStatus::Free,
                },
                PortReport {
                    port: 8080,
                    status: PortStatus::Released,
                },
            ]
        );
        assert!(!report.critical_ports_clear());
        assert_eq!(
            report.recommendation,
            crate::application::Recommendation::ElevationSuggested
        );
    }

    #[tokio::test]
    async fn test_run_survives_query_failures() {
        let fake = FakeSystem::new()
            .with_process(100, "node", "node vite", None)
            .with_listener(5173, 100)
            .with_failing_queries();

        let plan = quick_plan()
            .with_runtime_host("node", ["vite"])
            .with_ports(vec![5173], vec![5173]);

        let report = campaign(&fake, plan).run(&mut crate::application::Silent).await;

        assert_eq!(report.totals, SweepStats::default());
        assert_eq!(report.stages.len(), 5);
        assert!(fake.signals().is_empty());
    }
}
