//! Process signaller port (interface).

use crate::error::Result;

/// Port for sending termination requests.
///
/// Implementations handle platform-specific signal delivery. Neither method
/// waits for the target to exit; verification is the caller's job.
pub trait ProcessSignaller: Send + Sync {
    /// Ask `root` and its subtree to shut down cooperatively.
    ///
    /// `tree` lists every member (root first) for platforms that cannot
    /// address a subtree in one request.
    fn terminate_tree_gracefully(
        &self,
        root: u32,
        tree: &[u32],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Terminate `pid` unconditionally.
    ///
    /// Forcing a pid that is already gone is a no-op, not an error.
    fn kill_forcefully(&self, pid: u32) -> impl std::future::Future<Output = Result<()>> + Send;
}
