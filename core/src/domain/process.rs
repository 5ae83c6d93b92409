//! Process domain models.

use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of one entry in the OS process table.
///
/// Records are fetched fresh for every query and never cached: the live
/// table is the source of truth and the sweep mutates it as it goes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Process ID.
    pub pid: u32,

    /// Image name (e.g. "node", "node.exe").
    pub name: String,

    /// Full command line, empty when the OS would not reveal it.
    pub command_line: String,

    /// Parent process ID, if known.
    pub parent_pid: Option<u32>,
}

impl ProcessRecord {
    /// Create a record without a known parent.
    pub fn new(pid: u32, name: impl Into<String>, command_line: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
            command_line: command_line.into(),
            parent_pid: None,
        }
    }

    /// Check whether the command line contains any of the keywords.
    ///
    /// Matching is case-insensitive and keywords are OR-ed together.
    pub fn command_contains_any<S: AsRef<str>>(&self, keywords: &[S]) -> bool {
        let command = self.command_line.to_lowercase();
        keywords
            .iter()
            .any(|kw| command.contains(&kw.as_ref().to_lowercase()))
    }

    /// Command line shortened to `max` characters for console display.
    pub fn display_command(&self, max: usize) -> String {
        truncate(&self.command_line, max)
    }
}

impl std::fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (PID: {})", self.name, self.pid)
    }
}

/// A root process plus every descendant discovered at query time.
///
/// Recomputed before every termination attempt, since children may have
/// spawned after the last query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessTree {
    /// The process the tree was expanded from.
    pub root: u32,

    /// Transitive children in discovery order (depth first).
    pub descendants: Vec<u32>,
}

impl ProcessTree {
    /// Tree consisting only of the root.
    pub fn leaf(root: u32) -> Self {
        Self {
            root,
            descendants: Vec::new(),
        }
    }

    /// Every pid in the tree, root first.
    pub fn targets(&self) -> impl Iterator<Item = u32> + '_ {
        std::iter::once(self.root).chain(self.descendants.iter().copied())
    }

    /// Number of processes in the tree including the root.
    pub fn size(&self) -> usize {
        self.descendants.len() + 1
    }
}

/// Truncate to `max` characters, appending "..." when shortened.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_contains_any_is_case_insensitive() {
        let proc = ProcessRecord::new(
            100,
            "node.exe",
            "node C:\\app\\node_modules\\VITE\\bin\\vite.js dev",
        );
        assert!(proc.command_contains_any(&["vite"]));
        assert!(proc.command_contains_any(&["nothing", "DEV"]));
        assert!(!proc.command_contains_any(&["webpack"]));
        assert!(!proc.command_contains_any::<&str>(&[]));
    }

    #[test]
    fn test_display_command_truncates() {
        let long = "x".repeat(100);
        let proc = ProcessRecord::new(1, "node", long);
        let shown = proc.display_command(80);
        assert_eq!(shown.len(), 83);
        assert!(shown.ends_with("..."));

        let short = ProcessRecord::new(1, "node", "node server.js");
        assert_eq!(short.display_command(80), "node server.js");
    }

    #[test]
    fn test_tree_targets_root_first() {
        let tree = ProcessTree {
            root: 100,
            descendants: vec![101, 102],
        };
        assert_eq!(tree.targets().collect::<Vec<_>>(), vec![100, 101, 102]);
        assert_eq!(tree.size(), 3);

        let leaf = ProcessTree::leaf(7);
        assert_eq!(leaf.targets().collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn test_display() {
        let proc = ProcessRecord::new(101, "esbuild", "esbuild --service");
        assert_eq!(proc.to_string(), "esbuild (PID: 101)");
    }
}
