//! Text-table parsers for directory-query output.
//!
//! Every brittle assumption about `ps`, `wmic`, `ss`, `lsof` and `netstat`
//! output lives here. The parsers are platform-neutral so they can be
//! tested on any host; the adapters pick the ones their OS needs.
//! Malformed lines are skipped, never reported.

use std::collections::HashMap;

use crate::domain::{split_port, ConnectionRecord, ProcessRecord, Protocol};

/// Parse `ps -axo pid=,ppid=,ucomm=` into `pid -> (ppid, name)`.
///
/// The name is the remainder of the line, so names containing spaces survive.
pub fn parse_ps_names(output: &str) -> HashMap<u32, (Option<u32>, String)> {
    let mut names = HashMap::new();

    for line in output.lines() {
        let Some((pid, rest)) = next_field(line) else {
            continue;
        };
        let Ok(pid) = pid.parse::<u32>() else {
            continue;
        };
        let Some((ppid, name)) = next_field(rest) else {
            continue;
        };
        let ppid = ppid.parse::<u32>().ok().filter(|ppid| *ppid != 0);
        let name = name.trim();
        if name.is_empty() {
            continue;
        }

        names.insert(pid, (ppid, name.to_string()));
    }

    names
}

/// Split off the first whitespace-delimited field.
fn next_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    Some(s.split_once(char::is_whitespace).unwrap_or((s, "")))
}

/// Parse `ps -axo pid=,args=` into `pid -> command line`.
pub fn parse_ps_args(output: &str) -> HashMap<u32, String> {
    let mut commands = HashMap::new();

    for line in output.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.splitn(2, char::is_whitespace);
        let pid: u32 = match parts.next().map(str::parse) {
            Some(Ok(p)) => p,
            _ => continue,
        };
        let command = parts.next().map(str::trim).unwrap_or_default();

        commands.insert(pid, command.to_string());
    }

    commands
}

/// Join the two `ps` tables into records ordered by pid.
///
/// A process that exited between the two queries keeps an empty command line.
pub fn join_ps(
    names: HashMap<u32, (Option<u32>, String)>,
    mut commands: HashMap<u32, String>,
) -> Vec<ProcessRecord> {
    let mut records: Vec<ProcessRecord> = names
        .into_iter()
        .map(|(pid, (ppid, name))| ProcessRecord {
            pid,
            command_line: commands.remove(&pid).unwrap_or_default(),
            name,
            parent_pid: ppid,
        })
        .collect();

    records.sort_by_key(|r| r.pid);
    records
}

/// Parse `wmic process get ProcessId,ParentProcessId,Name,CommandLine /format:list`.
///
/// Example output (records separated by blank lines):
/// ```text
/// CommandLine="C:\Program Files\nodejs\node.exe" vite dev --port 5173
/// Name=node.exe
/// ParentProcessId=4312
/// ProcessId=9120
/// ```
pub fn parse_wmic_list(output: &str) -> Vec<ProcessRecord> {
    let mut records = Vec::new();
    let mut current: HashMap<&str, &str> = HashMap::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            flush_wmic_record(&mut current, &mut records);
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            current.insert(key.trim(), value.trim());
        }
    }
    flush_wmic_record(&mut current, &mut records);

    records.sort_by_key(|r| r.pid);
    records
}

fn flush_wmic_record(current: &mut HashMap<&str, &str>, records: &mut Vec<ProcessRecord>) {
    if let Some(pid) = current.get("ProcessId").and_then(|s| s.parse::<u32>().ok()) {
        records.push(ProcessRecord {
            pid,
            name: current.get("Name").copied().unwrap_or_default().to_string(),
            command_line: current
                .get("CommandLine")
                .copied()
                .unwrap_or_default()
                .to_string(),
            parent_pid: current
                .get("ParentProcessId")
                .and_then(|s| s.parse::<u32>().ok())
                .filter(|ppid| *ppid != pid),
        });
    }
    current.clear();
}

/// Parse `ss -Htanup`, keeping sockets whose local port is `port`.
///
/// Example line:
/// ```text
/// tcp   LISTEN 0      511          0.0.0.0:5173      0.0.0.0:*    users:(("node",pid=4242,fd=21))
/// ```
/// A socket shared by several processes yields one record per pid. Rows
/// without a users column (another user's socket, seen without privilege)
/// yield a single unowned record.
pub fn parse_ss(output: &str, port: u16) -> Vec<ConnectionRecord> {
    let mut records = Vec::new();

    for line in output.lines() {
        let components: Vec<&str> = line.split_whitespace().collect();
        if components.len() < 6 {
            continue;
        }

        let Some(protocol) = Protocol::parse(components[0]) else {
            continue;
        };
        let local = components[4];
        if split_port(local).map(|(_, p)| p) != Some(port) {
            continue;
        }

        let state = match protocol {
            Protocol::Tcp => Some(components[1].to_string()),
            Protocol::Udp => None,
        };
        let users = components[6..].join(" ");

        let pids = pids_in_ss_users(&users);
        if pids.is_empty() {
            records.push(ConnectionRecord::unowned(protocol, local, state));
            continue;
        }
        for pid in pids {
            records.push(ConnectionRecord::new(protocol, local, state.clone(), pid));
        }
    }

    records
}

/// Extract every `pid=N` from an ss `users:((...))` column.
fn pids_in_ss_users(users: &str) -> Vec<u32> {
    users
        .match_indices("pid=")
        .filter_map(|(i, _)| {
            let digits: String = users[i + 4..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect();
            digits.parse().ok()
        })
        .filter(|pid| *pid != 0)
        .collect()
}

/// Parse `lsof -nP -i :PORT`, keeping sockets whose local port is `port`.
///
/// Example output:
/// ```text
/// COMMAND   PID USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
/// node    34805 code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:5173 (LISTEN)
/// node    34805 code   23u  IPv6 0x3d8015e195af2a1b      0t0  TCP [::1]:5173->[::1]:50412 (ESTABLISHED)
/// ```
/// `-i :PORT` also matches remote ports, so the local side of `NAME` is checked.
pub fn parse_lsof(output: &str, port: u16) -> Vec<ConnectionRecord> {
    let mut records = Vec::new();

    for line in output.lines().skip(1) {
        let components: Vec<&str> = line.split_whitespace().collect();
        if components.len() < 9 {
            continue;
        }

        let pid: u32 = match components[1].parse() {
            Ok(p) if p != 0 => p,
            _ => continue,
        };
        let Some(protocol) = Protocol::parse(components[7]) else {
            continue;
        };

        let name = components[8];
        let local = name.split("->").next().unwrap_or(name);
        if split_port(local).map(|(_, p)| p) != Some(port) {
            continue;
        }

        let state = components
            .get(9)
            .map(|s| s.trim_start_matches('(').trim_end_matches(')').to_string());

        records.push(ConnectionRecord::new(protocol, local, state, pid));
    }

    records
}

/// Parse `netstat -ano`, keeping sockets whose local port is `port`.
///
/// Example output:
/// ```text
///   Proto  Local Address          Foreign Address        State           PID
///   TCP    127.0.0.1:5173         0.0.0.0:0              LISTENING       5432
///   UDP    0.0.0.0:5173           *:*                                    5432
/// ```
/// UDP rows have no state column. PID 0 (system idle) is never an owner;
/// such rows are kept unowned.
pub fn parse_netstat(output: &str, port: u16) -> Vec<ConnectionRecord> {
    let mut records = Vec::new();

    for line in output.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }

        let Some(protocol) = Protocol::parse(parts[0]) else {
            continue;
        };

        let local = parts[1];
        if split_port(local).map(|(_, p)| p) != Some(port) {
            continue;
        }

        let Some(Ok(pid)) = parts.last().map(|s| s.parse::<u32>()) else {
            continue;
        };

        let state = if parts.len() >= 5 {
            Some(parts[3].to_string())
        } else {
            None
        };

        records.push(match pid {
            0 => ConnectionRecord::unowned(protocol, local, state),
            pid => ConnectionRecord::new(protocol, local, state, pid),
        });
    }

    records
}

/// Scheduler state letter from a Linux `/proc/<pid>/stat` line.
///
/// The command name sits in parentheses and may itself contain spaces or
/// parentheses, so the state is read after the last `)`.
/// ```text
/// 8503 (python3) Z 1 8503 8503 0 -1 4227148 ...
/// ```
pub fn proc_stat_state(stat: &str) -> Option<char> {
    let (_, rest) = stat.rsplit_once(')')?;
    rest.trim_start().chars().next()
}

/// Scheduler state letter from `ps -o stat= -p PID` ("Z", "S+", "Ss", ...).
pub fn ps_stat_state(output: &str) -> Option<char> {
    output.trim().chars().next()
}

/// Check whether `tasklist /FI "PID eq N" /NH /FO CSV` lists `pid`.
///
/// Example output when found:
/// ```text
/// "node.exe","5432","Console","1","45,000 K"
/// ```
/// When nothing matches tasklist prints an `INFO:` line instead.
pub fn tasklist_contains(output: &str, pid: u32) -> bool {
    output.lines().any(|line| {
        line.trim()
            .split("\",\"")
            .nth(1)
            .map(|field| field.trim_matches('"'))
            .and_then(|field| field.parse::<u32>().ok())
            == Some(pid)
    })
}
