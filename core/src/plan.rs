//! The cleanup campaign's fixed target lists and settle timing.
//!
//! There is no configuration file: `CleanupPlan::default()` is the campaign,
//! and the `with_*` builders exist for callers that need a different one
//! (tests mostly).

use std::time::Duration;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Attempts per tree for name and pattern sweeps.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Attempts per tree for port owners, which tend to be stubborn servers.
pub const PORT_MAX_ATTEMPTS: u32 = 5;

/// Image name as it appears in the process table on this platform.
pub fn image_name(base: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", base)
    } else {
        base.to_string()
    }
}

/// A command-line pattern and the label printed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternTarget {
    pub pattern: String,
    pub label: String,
}

impl PatternTarget {
    pub fn new(pattern: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            label: label.into(),
        }
    }

    /// Compile the pattern for case-insensitive matching.
    pub fn compile(&self) -> Result<Regex> {
        RegexBuilder::new(&self.pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::InvalidPattern {
                pattern: self.pattern.clone(),
                reason: e.to_string(),
            })
    }
}

/// Pauses inserted after signalling so the OS can converge before a check.
///
/// These are heuristic settle times, not synchronization: a slow machine may
/// need longer and verification may still fail. Tests use `none()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleDelays {
    /// After the graceful tree request (first attempt only).
    pub graceful: Duration,
    /// After each round of forceful kills, before verifying.
    pub force: Duration,
    /// Between consecutive targets in a stage.
    pub between_targets: Duration,
    /// After terminating each owner of a port.
    pub after_port_kill: Duration,
    /// Before re-querying a port after its owners were terminated.
    pub port_recheck: Duration,
    /// Before the final critical-port verification.
    pub final_verification: Duration,
}

impl SettleDelays {
    /// No pauses at all.
    pub const fn none() -> Self {
        Self {
            graceful: Duration::ZERO,
            force: Duration::ZERO,
            between_targets: Duration::ZERO,
            after_port_kill: Duration::ZERO,
            port_recheck: Duration::ZERO,
            final_verification: Duration::ZERO,
        }
    }
}

impl Default for SettleDelays {
    fn default() -> Self {
        Self {
            graceful: Duration::from_millis(300),
            force: Duration::from_millis(200),
            between_targets: Duration::from_millis(100),
            after_port_kill: Duration::from_millis(300),
            port_recheck: Duration::from_millis(500),
            final_verification: Duration::from_secs(1),
        }
    }
}

/// Sleep for `delay` unless it is zero.
pub(crate) async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Everything the campaign targets, in sweep order.
#[derive(Debug, Clone)]
pub struct CleanupPlan {
    /// Stage 0: application processes killed outright.
    pub target_apps: Vec<String>,
    /// Stage 1: the runtime host image name...
    pub runtime_host: String,
    /// ...and the command-line markers that identify dev-tool instances of it.
    pub runtime_keywords: Vec<String>,
    /// Stage 2: auxiliary dev tools killed outright.
    pub dev_tools: Vec<String>,
    /// Stage 3: command-line patterns.
    pub patterns: Vec<PatternTarget>,
    /// Stage 4: ports to reclaim.
    pub ports: Vec<u16>,
    /// Stage 5: ports whose state decides the recommendation.
    pub critical_ports: Vec<u16>,
    pub max_attempts: u32,
    pub port_max_attempts: u32,
    pub delays: SettleDelays,
}

impl Default for CleanupPlan {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|n| image_name(n)).collect::<Vec<_>>();

        Self {
            target_apps: names(&[
                "verge-mihomo",
                "verge-mihomo-alpha",
                "clash-verge-service",
                "clash-verge",
                "mihomo",
                "clash",
                "clash-meta",
            ]),
            runtime_host: image_name("node"),
            runtime_keywords: ["vite", "dev", "tauri", "pnpm", "npm"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            dev_tools: names(&["vite", "pnpm", "npm", "yarn", "bun", "deno"]),
            patterns: vec![
                PatternTarget::new(r"tauri.*dev", "Tauri dev server"),
                PatternTarget::new(r"vite.*--port.*5173", "Vite dev server"),
                PatternTarget::new(r"webpack.*dev.*server", "Webpack dev server"),
            ],
            ports: vec![1420, 5173, 3000, 3001, 8080, 8081, 9000, 9001],
            critical_ports: vec![1420, 5173],
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            port_max_attempts: PORT_MAX_ATTEMPTS,
            delays: SettleDelays::default(),
        }
    }
}

impl CleanupPlan {
    /// A plan that targets nothing; build it up with the `with_*` methods.
    pub fn empty() -> Self {
        Self {
            target_apps: Vec::new(),
            runtime_host: String::new(),
            runtime_keywords: Vec::new(),
            dev_tools: Vec::new(),
            patterns: Vec::new(),
            ports: Vec::new(),
            critical_ports: Vec::new(),
            ..Self::default()
        }
    }

    pub fn with_target_apps<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_apps = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_runtime_host<I, S>(mut self, name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runtime_host = name.into();
        self.runtime_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dev_tools<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dev_tools = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_patterns(mut self, patterns: Vec<PatternTarget>) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn with_ports(mut self, ports: Vec<u16>, critical_ports: Vec<u16>) -> Self {
        self.ports = ports;
        self.critical_ports = critical_ports;
        self
    }

    pub fn with_attempts(mut self, max_attempts: u32, port_max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self.port_max_attempts = port_max_attempts;
        self
    }

    pub fn with_delays(mut self, delays: SettleDelays) -> Self {
        self.delays = delays;
        self
    }
}
