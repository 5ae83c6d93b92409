//! Windows process table using `wmic` and `tasklist`.

use tracing::warn;

use crate::adapters::command;
use crate::adapters::parse;
use crate::domain::ProcessRecord;
use crate::error::Result;

use super::ProcessTable;

/// Process table backed by `wmic process ... /format:list`.
pub struct WmicTable;

impl WmicTable {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessTable for WmicTable {
    async fn snapshot(&self) -> Result<Vec<ProcessRecord>> {
        let output = command::run(
            "wmic",
            &[
                "process",
                "get",
                "ProcessId,ParentProcessId,Name,CommandLine",
                "/format:list",
            ],
        )
        .await?;

        Ok(parse::parse_wmic_list(&output))
    }

    async fn exists(&self, pid: u32) -> bool {
        let filter = format!("PID eq {}", pid);
        match command::run("tasklist", &["/FI", &filter, "/NH", "/FO", "CSV"]).await {
            Ok(output) => parse::tasklist_contains(&output, pid),
            Err(e) => {
                warn!(pid = pid, error = %e, "Failed to check if process is running");
                false
            }
        }
    }
}
