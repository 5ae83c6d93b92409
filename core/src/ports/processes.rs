//! Process directory port (interface).

use crate::domain::ProcessRecord;
use crate::error::Result;

/// Port for read-only queries against the OS process table.
///
/// Every call reflects the table at the moment of the call. A pid that
/// does not exist is a normal outcome (empty / `None` / `false`), never
/// an error; `Err` is reserved for the query itself failing.
pub trait ProcessDirectory: Send + Sync {
    /// Direct children of `pid`.
    fn list_children(&self, pid: u32) -> impl std::future::Future<Output = Result<Vec<u32>>> + Send;

    /// Best-effort description of `pid`, `None` if it is already gone.
    fn describe(
        &self,
        pid: u32,
    ) -> impl std::future::Future<Output = Result<Option<ProcessRecord>>> + Send;

    /// Processes whose image name equals `name` (case-sensitive).
    fn find(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ProcessRecord>>> + Send;

    /// Every running process with its command line.
    fn find_all(&self) -> impl std::future::Future<Output = Result<Vec<ProcessRecord>>> + Send;

    /// Point-in-time liveness check.
    fn exists(&self, pid: u32) -> impl std::future::Future<Output = bool> + Send;
}
