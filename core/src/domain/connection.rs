//! Network connection domain models.

use serde::{Deserialize, Serialize};

/// Transport protocol of a socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    /// Parse a protocol column ("tcp", "TCP6", "udp4", ...).
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("tcp") {
            Some(Protocol::Tcp)
        } else if lower.starts_with("udp") {
            Some(Protocol::Udp)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        })
    }
}

/// A socket bound to a local port and the process that owns it.
///
/// Several records may share one owning pid when a process holds more
/// than one socket on the same port. The owner is absent when the OS hides
/// it (another user's socket seen without privilege, kernel-owned rows).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub protocol: Protocol,

    /// Local address including port (e.g. "127.0.0.1:5173", "[::]:3000").
    pub local_address: String,

    /// Connection state, absent for stateless sockets (UDP).
    pub state: Option<String>,

    pub owning_pid: Option<u32>,
}

impl ConnectionRecord {
    pub fn new(
        protocol: Protocol,
        local_address: impl Into<String>,
        state: Option<String>,
        owning_pid: u32,
    ) -> Self {
        Self {
            protocol,
            local_address: local_address.into(),
            state,
            owning_pid: Some(owning_pid),
        }
    }

    /// A socket whose owner is not visible.
    pub fn unowned(
        protocol: Protocol,
        local_address: impl Into<String>,
        state: Option<String>,
    ) -> Self {
        Self {
            protocol,
            local_address: local_address.into(),
            state,
            owning_pid: None,
        }
    }

    /// Whether this socket keeps its local port taken.
    ///
    /// Owned sockets always count. Without an owner only bound sockets do
    /// (TCP listeners and UDP); lingering TIME_WAIT rows do not.
    pub fn holds_port(&self) -> bool {
        self.owning_pid.is_some()
            || self.protocol == Protocol::Udp
            || self.state.as_deref().is_some_and(is_listen_state)
    }

    /// Port parsed from the local address.
    pub fn local_port(&self) -> Option<u16> {
        split_port(&self.local_address).map(|(_, port)| port)
    }
}

fn is_listen_state(state: &str) -> bool {
    state.eq_ignore_ascii_case("LISTEN") || state.eq_ignore_ascii_case("LISTENING")
}

/// Distinct visible owning pids in first-seen order.
pub fn owning_pids(records: &[ConnectionRecord]) -> Vec<u32> {
    let mut pids = Vec::new();
    for pid in records.iter().filter_map(|r| r.owning_pid) {
        if !pids.contains(&pid) {
            pids.push(pid);
        }
    }
    pids
}

/// Whether any of `records` keeps the port taken.
pub fn port_is_held(records: &[ConnectionRecord]) -> bool {
    records.iter().any(ConnectionRecord::holds_port)
}

/// Split "host:port" into its parts, handling "[v6]:port" and "*:port".
pub fn split_port(address: &str) -> Option<(&str, u16)> {
    if let Some(rest) = address.strip_prefix('[') {
        let end = rest.find(']')?;
        let tail = &rest[end + 1..];
        // ss prints link-local scopes as "[fe80::1]%eth0:port"
        let tail = match tail.strip_prefix('%') {
            Some(scoped) => &scoped[scoped.find(':')?..],
            None => tail,
        };
        let port = tail.strip_prefix(':')?.parse().ok()?;
        return Some((&rest[..end], port));
    }

    let colon = address.rfind(':')?;
    let port = address[colon + 1..].parse().ok()?;
    Some((&address[..colon], port))
}

/// Occupancy of a port as observed by the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PortStatus {
    /// Nothing was bound to the port.
    Free,
    /// Owners were terminated and the port is now unbound.
    Released,
    /// Something still holds the port.
    StillOccupied,
}

impl PortStatus {
    pub fn is_clear(self) -> bool {
        !matches!(self, PortStatus::StillOccupied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_parse() {
        assert_eq!(Protocol::parse("tcp"), Some(Protocol::Tcp));
        assert_eq!(Protocol::parse("TCP6"), Some(Protocol::Tcp));
        assert_eq!(Protocol::parse("udp"), Some(Protocol::Udp));
        assert_eq!(Protocol::parse("raw"), None);
    }

    #[test]
    fn test_split_port() {
        assert_eq!(split_port("127.0.0.1:5173"), Some(("127.0.0.1", 5173)));
        assert_eq!(split_port("[::1]:3000"), Some(("::1", 3000)));
        assert_eq!(split_port("[::]:8080"), Some(("::", 8080)));
        assert_eq!(split_port("*:1420"), Some(("*", 1420)));
        assert_eq!(split_port("[fe80::1]%eth0:5173"), Some(("fe80::1", 5173)));
        assert_eq!(split_port("[fe80::1]%eth0"), None);
        assert_eq!(split_port("0.0.0.0:*"), None);
        assert_eq!(split_port("garbage"), None);
    }

    #[test]
    fn test_owning_pids_dedupes_in_order() {
        let records = vec![
            ConnectionRecord::new(Protocol::Tcp, "0.0.0.0:8080", Some("LISTEN".into()), 555),
            ConnectionRecord::new(Protocol::Tcp, "[::]:8080", Some("LISTEN".into()), 555),
            ConnectionRecord::new(Protocol::Udp, "0.0.0.0:8080", None, 42),
        ];
        assert_eq!(owning_pids(&records), vec![555, 42]);
        assert_eq!(records[1].local_port(), Some(8080));
    }

    #[test]
    fn test_hidden_owner_still_holds_port() {
        let hidden =
            ConnectionRecord::unowned(Protocol::Tcp, "0.0.0.0:5173", Some("LISTEN".into()));
        assert!(hidden.holds_port());
        assert!(owning_pids(std::slice::from_ref(&hidden)).is_empty());
        assert!(port_is_held(&[hidden]));

        let udp = ConnectionRecord::unowned(Protocol::Udp, "0.0.0.0:5173", None);
        assert!(udp.holds_port());

        let lingering =
            ConnectionRecord::unowned(Protocol::Tcp, "127.0.0.1:5173", Some("TIME-WAIT".into()));
        assert!(!lingering.holds_port());
        assert!(!port_is_held(&[lingering]));
        assert!(!port_is_held(&[]));
    }

    #[test]
    fn test_port_status_is_clear() {
        assert!(PortStatus::Free.is_clear());
        assert!(PortStatus::Released.is_clear());
        assert!(!PortStatus::StillOccupied.is_clear());
    }
}
