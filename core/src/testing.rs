//! In-memory process and connection tables for tests.

use std::collections::{BTreeMap, HashSet};

use parking_lot::Mutex;

use crate::domain::{ConnectionRecord, ProcessRecord, Protocol};
use crate::error::{Error, Result};
use crate::ports::{ConnectionDirectory, ProcessDirectory, ProcessSignaller};

/// A signal the fake received, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalEvent {
    Graceful { root: u32, tree: Vec<u32> },
    Force(u32),
}

#[derive(Default)]
struct FakeState {
    processes: BTreeMap<u32, ProcessRecord>,
    connections: Vec<ConnectionRecord>,
    unkillable: HashSet<u32>,
    graceful_exits: bool,
    failing_queries: bool,
    signals: Vec<SignalEvent>,
}

impl FakeState {
    fn remove(&mut self, pid: u32) {
        if self.unkillable.contains(&pid) {
            return;
        }
        self.processes.remove(&pid);
        self.connections.retain(|c| c.owning_pid != Some(pid));
    }
}

/// Fake OS: process table, connection table and signal log in one.
///
/// Forced kills remove the process (and its sockets) unless it was marked
/// unkillable. Graceful requests are ignored unless `graceful_exits` is set.
#[derive(Default)]
pub struct FakeSystem {
    state: Mutex<FakeState>,
}

impl FakeSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_process(
        self,
        pid: u32,
        name: &str,
        command_line: &str,
        parent: Option<u32>,
    ) -> Self {
        let mut record = ProcessRecord::new(pid, name, command_line);
        record.parent_pid = parent;
        self.state.lock().processes.insert(pid, record);
        self
    }

    pub fn with_listener(self, port: u16, pid: u32) -> Self {
        self.state.lock().connections.push(ConnectionRecord::new(
            Protocol::Tcp,
            format!("0.0.0.0:{}", port),
            Some("LISTEN".to_string()),
            pid,
        ));
        self
    }

    /// A listener whose owner the OS does not reveal.
    pub fn with_hidden_listener(self, port: u16) -> Self {
        self.state.lock().connections.push(ConnectionRecord::unowned(
            Protocol::Tcp,
            format!("0.0.0.0:{}", port),
            Some("LISTEN".to_string()),
        ));
        self
    }

    pub fn with_unkillable(self, pid: u32) -> Self {
        self.state.lock().unkillable.insert(pid);
        self
    }

    pub fn with_graceful_exits(self) -> Self {
        self.state.lock().graceful_exits = true;
        self
    }

    pub fn with_failing_queries(self) -> Self {
        self.state.lock().failing_queries = true;
        self
    }

    pub fn is_alive(&self, pid: u32) -> bool {
        self.state.lock().processes.contains_key(&pid)
    }

    pub fn signals(&self) -> Vec<SignalEvent> {
        self.state.lock().signals.clone()
    }

    pub fn graceful_count(&self) -> usize {
        self.signals()
            .iter()
            .filter(|s| matches!(s, SignalEvent::Graceful { .. }))
            .count()
    }

    pub fn force_count(&self, pid: u32) -> usize {
        self.signals()
            .iter()
            .filter(|s| **s == SignalEvent::Force(pid))
            .count()
    }

    /// Roots that received a graceful request, in order.
    pub fn graceful_roots(&self) -> Vec<u32> {
        self.signals()
            .iter()
            .filter_map(|s| match s {
                SignalEvent::Graceful { root, .. } => Some(*root),
                SignalEvent::Force(_) => None,
            })
            .collect()
    }

    fn check_queries(&self) -> Result<()> {
        if self.state.lock().failing_queries {
            return Err(Error::CommandFailed("simulated query failure".to_string()));
        }
        Ok(())
    }
}

impl ProcessDirectory for FakeSystem {
    async fn list_children(&self, pid: u32) -> Result<Vec<u32>> {
        self.check_queries()?;
        Ok(self
            .state
            .lock()
            .processes
            .values()
            .filter(|p| p.parent_pid == Some(pid))
            .map(|p| p.pid)
            .collect())
    }

    async fn describe(&self, pid: u32) -> Result<Option<ProcessRecord>> {
        self.check_queries()?;
        Ok(self.state.lock().processes.get(&pid).cloned())
    }

    async fn find(&self, name: &str) -> Result<Vec<ProcessRecord>> {
        self.check_queries()?;
        Ok(self
            .state
            .lock()
            .processes
            .values()
            .filter(|p| p.name == name)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<ProcessRecord>> {
        self.check_queries()?;
        Ok(self.state.lock().processes.values().cloned().collect())
    }

    async fn exists(&self, pid: u32) -> bool {
        self.is_alive(pid)
    }
}

impl ConnectionDirectory for FakeSystem {
    async fn find_by_port(&self, port: u16) -> Result<Vec<ConnectionRecord>> {
        self.check_queries()?;
        Ok(self
            .state
            .lock()
            .connections
            .iter()
            .filter(|c| c.local_port() == Some(port))
            .cloned()
            .collect())
    }
}

impl ProcessSignaller for FakeSystem {
    async fn terminate_tree_gracefully(&self, root: u32, tree: &[u32]) -> Result<()> {
        let mut state = self.state.lock();
        state.signals.push(SignalEvent::Graceful {
            root,
            tree: tree.to_vec(),
        });
        if state.graceful_exits {
            for &pid in tree {
                state.remove(pid);
            }
        }
        Ok(())
    }

    async fn kill_forcefully(&self, pid: u32) -> Result<()> {
        let mut state = self.state.lock();
        state.signals.push(SignalEvent::Force(pid));
        state.remove(pid);
        Ok(())
    }
}
