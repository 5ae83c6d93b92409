//! Process-tree termination with escalation and verification.
//!
//! Protocol for one root pid:
//! 1. Snapshot the tree (root plus every transitive child).
//! 2. First attempt only: one graceful request for the whole tree, then
//!    a short pause for cooperative shutdown.
//! 3. Every attempt: force-kill each tree member, pause, then check whether
//!    the root is gone. Gone means success.
//! 4. Attempts exhausted with the root alive means failure.
//!
//! Only the root is verified. Child pids can be recycled by the OS quickly,
//! so their liveness says little; a root surviving repeated force-kills of
//! the whole tree is the anomaly worth reporting.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::domain::{KillOutcome, ProcessTree};
use crate::plan::{settle, SettleDelays};
use crate::ports::{ProcessDirectory, ProcessSignaller};

/// Drives the termination protocol against one tree at a time.
pub struct Terminator<'a, P, S> {
    processes: &'a P,
    signaller: &'a S,
    delays: SettleDelays,
}

impl<'a, P: ProcessDirectory, S: ProcessSignaller> Terminator<'a, P, S> {
    pub fn new(processes: &'a P, signaller: &'a S, delays: SettleDelays) -> Self {
        Self {
            processes,
            signaller,
            delays,
        }
    }

    /// Expand `root` into its current process tree.
    ///
    /// A failed children query counts as "no children". A pid seen twice
    /// (recycled while walking) is only visited once.
    pub async fn expand_tree(&self, root: u32) -> ProcessTree {
        let mut tree = ProcessTree::leaf(root);
        let mut visited = HashSet::from([root]);
        let mut stack = vec![root];

        while let Some(pid) = stack.pop() {
            if pid != root {
                tree.descendants.push(pid);
            }

            let children = match self.processes.list_children(pid).await {
                Ok(children) => children,
                Err(e) => {
                    warn!(pid = pid, error = %e, "Failed to list child processes");
                    Vec::new()
                }
            };

            for child in children.into_iter().rev() {
                if visited.insert(child) {
                    stack.push(child);
                }
            }
        }

        tree
    }

    /// Terminate `root` and all its descendants, retrying up to `max_attempts` times.
    pub async fn terminate_tree(&self, root: u32, max_attempts: u32) -> KillOutcome {
        let tree = self.expand_tree(root).await;
        let targets: Vec<u32> = tree.targets().collect();
        let max_attempts = max_attempts.max(1);

        debug!(pid = root, tree_size = tree.size(), "Terminating process tree");

        for attempt in 1..=max_attempts {
            if attempt == 1 {
                if let Err(e) = self.signaller.terminate_tree_gracefully(root, &targets).await {
                    debug!(pid = root, error = %e, "Graceful tree termination failed");
                }
                settle(self.delays.graceful).await;
            }

            for &pid in &targets {
                if let Err(e) = self.signaller.kill_forcefully(pid).await {
                    debug!(pid = pid, error = %e, "Force kill failed");
                }
            }
            settle(self.delays.force).await;

            if !self.processes.exists(root).await {
                debug!(pid = root, attempt = attempt, "Process tree terminated");
                return KillOutcome {
                    pid: root,
                    attempts: attempt,
                    succeeded: true,
                };
            }

            debug!(pid = root, attempt = attempt, "Process still running after force kill");
        }

        warn!(pid = root, attempts = max_attempts, "Process survived all termination attempts");
        KillOutcome {
            pid: root,
            attempts: max_attempts,
            succeeded: false,
        }
    }
}
