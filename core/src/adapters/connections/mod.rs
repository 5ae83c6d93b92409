//! Connection directory adapters.
//!
//! Platform-specific implementations of port-to-process resolution.

#[cfg(all(unix, not(target_os = "linux")))]
mod darwin;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(windows)]
mod windows;

use crate::domain::ConnectionRecord;
use crate::error::Result;
use crate::ports::ConnectionDirectory;

/// The OS connection table, through the platform's native tools.
pub struct SystemConnectionDirectory {
    #[cfg(all(unix, not(target_os = "linux")))]
    inner: darwin::LsofTable,

    #[cfg(target_os = "linux")]
    inner: linux::SsTable,

    #[cfg(windows)]
    inner: windows::NetstatTable,
}

impl SystemConnectionDirectory {
    /// Create a connection directory for the current platform.
    pub fn new() -> Self {
        Self {
            #[cfg(all(unix, not(target_os = "linux")))]
            inner: darwin::LsofTable::new(),

            #[cfg(target_os = "linux")]
            inner: linux::SsTable::new(),

            #[cfg(windows)]
            inner: windows::NetstatTable::new(),
        }
    }
}

impl Default for SystemConnectionDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionDirectory for SystemConnectionDirectory {
    async fn find_by_port(&self, port: u16) -> Result<Vec<ConnectionRecord>> {
        self.inner.find_by_port(port).await
    }
}

/// Internal trait for platform-specific implementations.
trait ConnectionTable: Send + Sync {
    fn find_by_port(
        &self,
        port: u16,
    ) -> impl std::future::Future<Output = Result<Vec<ConnectionRecord>>> + Send;
}
