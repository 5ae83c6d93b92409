//! Windows termination through `taskkill`.

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Drives `taskkill` for both graceful and forced requests.
#[derive(Debug, Default)]
pub struct TaskkillSignaller;

impl TaskkillSignaller {
    /// Run taskkill with the given arguments.
    ///
    /// "Not found" and "already terminated" both count as success.
    async fn taskkill(&self, pid: u32, args: &[&str]) -> Result<()> {
        debug!(pid = pid, ?args, "Executing taskkill");

        let output = Command::new("taskkill").args(args).output().await?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let combined = format!("{} {}", stdout, stderr);

        if combined.contains("not found")
            || combined.contains("could not be found")
            || combined.contains("already been terminated")
            || combined.contains("has exited")
        {
            debug!(pid = pid, "Process already terminated");
            return Ok(());
        }

        if combined.contains("Access is denied") || combined.contains("access denied") {
            warn!(pid = pid, "Access denied to kill process");
            return Err(Error::SignalFailed {
                pid,
                reason: "access denied".to_string(),
            });
        }

        Err(Error::SignalFailed {
            pid,
            reason: combined.trim().to_string(),
        })
    }

    pub async fn terminate_tree_gracefully(&self, root: u32, _tree: &[u32]) -> Result<()> {
        let pid = root.to_string();
        self.taskkill(root, &["/PID", &pid, "/T"]).await
    }

    pub async fn kill_forcefully(&self, pid: u32) -> Result<()> {
        let pid_arg = pid.to_string();
        self.taskkill(pid, &["/F", "/PID", &pid_arg]).await
    }
}
