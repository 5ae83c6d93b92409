//! Unix process table using `ps` and `kill(pid, 0)`.
//!
//! A zombie (killed, not yet reaped by its parent) still answers
//! `kill(pid, 0)` but holds no resources, so it counts as gone.

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;

use crate::adapters::command;
use crate::adapters::parse;
use crate::domain::ProcessRecord;
use crate::error::Result;

use super::ProcessTable;

/// Process table backed by two `ps` queries joined by pid.
pub struct PsTable;

impl PsTable {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessTable for PsTable {
    async fn snapshot(&self) -> Result<Vec<ProcessRecord>> {
        // ucomm is the bare image name on both procps and BSD ps; the name
        // and the command line are queried separately so both may contain spaces.
        let names = command::run("ps", &["-axo", "pid=,ppid=,ucomm="]).await?;
        let args = command::run("ps", &["-axo", "pid=,args="]).await?;

        Ok(parse::join_ps(
            parse::parse_ps_names(&names),
            parse::parse_ps_args(&args),
        ))
    }

    async fn exists(&self, pid: u32) -> bool {
        let Ok(raw) = i32::try_from(pid) else {
            return false;
        };
        if raw == 0 {
            return false;
        }

        let signalable = match kill(Pid::from_raw(raw), None) {
            Ok(()) => true,
            // Alive but owned by someone else
            Err(Errno::EPERM) => true,
            Err(_) => false,
        };

        signalable && state(pid).await != Some(ZOMBIE)
    }
}

const ZOMBIE: char = 'Z';

#[cfg(target_os = "linux")]
async fn state(pid: u32) -> Option<char> {
    let stat = tokio::fs::read_to_string(format!("/proc/{}/stat", pid))
        .await
        .ok()?;
    parse::proc_stat_state(&stat)
}

#[cfg(not(target_os = "linux"))]
async fn state(pid: u32) -> Option<char> {
    let output = command::run("ps", &["-o", "stat=", "-p", &pid.to_string()])
        .await
        .ok()?;
    parse::ps_stat_state(&output)
}
