//! Target selection over the process directory.
//!
//! All modes are read-only. A failed directory query degrades to an empty
//! selection so one blind spot never halts the campaign.

use regex::Regex;
use tracing::warn;

use crate::domain::ProcessRecord;
use crate::ports::ProcessDirectory;

/// Picks termination targets out of the live process table.
pub struct Selector<'a, P> {
    processes: &'a P,
}

impl<'a, P: ProcessDirectory> Selector<'a, P> {
    pub fn new(processes: &'a P) -> Self {
        Self { processes }
    }

    /// Processes named exactly `name`.
    ///
    /// With keywords, only those whose command line contains at least one
    /// of them (case-insensitive) are kept. Filtering only ever narrows.
    pub async fn by_name<S: AsRef<str>>(&self, name: &str, keywords: &[S]) -> Vec<ProcessRecord> {
        let mut matches = match self.processes.find(name).await {
            Ok(found) => found,
            Err(e) => {
                warn!(name = name, error = %e, "Process lookup failed");
                return Vec::new();
            }
        };

        if !keywords.is_empty() {
            matches.retain(|p| p.command_contains_any(keywords));
        }
        matches
    }

    /// Processes whose command line matches `pattern`.
    ///
    /// Compile the pattern case-insensitively (see `PatternTarget::compile`).
    pub async fn by_pattern(&self, pattern: &Regex) -> Vec<ProcessRecord> {
        match self.processes.find_all().await {
            Ok(all) => all
                .into_iter()
                .filter(|p| pattern.is_match(&p.command_line))
                .collect(),
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "Process listing failed");
                Vec::new()
            }
        }
    }
}
