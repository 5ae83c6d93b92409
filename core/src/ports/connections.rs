//! Connection directory port (interface).

use crate::domain::ConnectionRecord;
use crate::error::Result;

/// Port for querying the OS network-connection table.
pub trait ConnectionDirectory: Send + Sync {
    /// All sockets whose local port is `port`, each with its owning pid.
    ///
    /// A free port yields an empty list.
    fn find_by_port(
        &self,
        port: u16,
    ) -> impl std::future::Future<Output = Result<Vec<ConnectionRecord>>> + Send;
}
