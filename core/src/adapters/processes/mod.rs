//! Process directory adapters.
//!
//! Platform-specific snapshots of the process table. Each query takes a
//! fresh snapshot; nothing is cached between calls.

#[cfg(unix)]
mod unix;

#[cfg(windows)]
mod windows;

use crate::domain::ProcessRecord;
use crate::error::Result;
use crate::ports::ProcessDirectory;

/// The OS process table, through the platform's native tools.
pub struct SystemProcessDirectory {
    #[cfg(unix)]
    inner: unix::PsTable,

    #[cfg(windows)]
    inner: windows::WmicTable,
}

impl SystemProcessDirectory {
    /// Create a process directory for the current platform.
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            inner: unix::PsTable::new(),

            #[cfg(windows)]
            inner: windows::WmicTable::new(),
        }
    }
}

impl Default for SystemProcessDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessDirectory for SystemProcessDirectory {
    async fn list_children(&self, pid: u32) -> Result<Vec<u32>> {
        let snapshot = self.inner.snapshot().await?;
        Ok(snapshot
            .into_iter()
            .filter(|p| p.parent_pid == Some(pid) && p.pid != pid)
            .map(|p| p.pid)
            .collect())
    }

    async fn describe(&self, pid: u32) -> Result<Option<ProcessRecord>> {
        let snapshot = self.inner.snapshot().await?;
        Ok(snapshot.into_iter().find(|p| p.pid == pid))
    }

    async fn find(&self, name: &str) -> Result<Vec<ProcessRecord>> {
        let snapshot = self.inner.snapshot().await?;
        Ok(snapshot.into_iter().filter(|p| p.name == name).collect())
    }

    async fn find_all(&self) -> Result<Vec<ProcessRecord>> {
        self.inner.snapshot().await
    }

    async fn exists(&self, pid: u32) -> bool {
        self.inner.exists(pid).await
    }
}

/// Internal trait for platform-specific implementations.
trait ProcessTable: Send + Sync {
    fn snapshot(&self) -> impl std::future::Future<Output = Result<Vec<ProcessRecord>>> + Send;

    fn exists(&self, pid: u32) -> impl std::future::Future<Output = bool> + Send;
}
