//! Unix signal delivery through `kill(2)`.

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::debug;

use crate::error::{Error, Result};

/// Sends SIGTERM/SIGKILL directly.
#[derive(Debug, Default)]
pub struct UnixSignaller;

impl UnixSignaller {
    /// Send `signal` to `pid`. A vanished process counts as delivered.
    fn send(&self, pid: u32, signal: Signal) -> Result<()> {
        let raw = i32::try_from(pid)
            .ok()
            .filter(|raw| *raw > 0)
            .ok_or_else(|| Error::SignalFailed {
                pid,
                reason: "not a valid process id".to_string(),
            })?;

        debug!(pid = pid, signal = %signal, "Sending signal to process");

        match kill(Pid::from_raw(raw), signal) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => {
                debug!(pid = pid, "Process not found, already terminated");
                Ok(())
            }
            Err(Errno::EPERM) => Err(Error::SignalFailed {
                pid,
                reason: "permission denied".to_string(),
            }),
            Err(errno) => Err(Error::SignalFailed {
                pid,
                reason: errno.desc().to_string(),
            }),
        }
    }

    pub async fn terminate_tree_gracefully(&self, root: u32, tree: &[u32]) -> Result<()> {
        self.send(root, Signal::SIGTERM)?;
        for &pid in tree.iter().filter(|&&pid| pid != root) {
            // Children may exit on their own once the root goes
            if let Err(e) = self.send(pid, Signal::SIGTERM) {
                debug!(pid = pid, error = %e, "SIGTERM to child failed");
            }
        }
        Ok(())
    }

    pub async fn kill_forcefully(&self, pid: u32) -> Result<()> {
        self.send(pid, Signal::SIGKILL)
    }
}
