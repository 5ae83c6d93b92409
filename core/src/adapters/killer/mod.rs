//! Process signaller adapters.
//!
//! Uses the following mechanisms:
//! - Unix: SIGTERM to every tree member for the graceful request,
//!   SIGKILL for the forceful one
//! - Windows: `taskkill /PID x /T` for the graceful request,
//!   `taskkill /F /PID x` for the forceful one

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

use crate::error::Result;
use crate::ports::ProcessSignaller;

/// Delivers termination requests through the platform's native mechanism.
#[derive(Debug, Default)]
pub struct SystemSignaller {
    #[cfg(unix)]
    inner: unix::UnixSignaller,

    #[cfg(windows)]
    inner: windows::TaskkillSignaller,
}

impl SystemSignaller {
    /// Create a signaller for the current platform.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProcessSignaller for SystemSignaller {
    async fn terminate_tree_gracefully(&self, root: u32, tree: &[u32]) -> Result<()> {
        self.inner.terminate_tree_gracefully(root, tree).await
    }

    async fn kill_forcefully(&self, pid: u32) -> Result<()> {
        self.inner.kill_forcefully(pid).await
    }
}
