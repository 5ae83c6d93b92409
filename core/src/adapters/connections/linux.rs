//! Linux connection table using `ss`.

use crate::adapters::command;
use crate::adapters::parse;
use crate::domain::ConnectionRecord;
use crate::error::Result;

use super::ConnectionTable;

/// Connection table backed by `ss -Htanup`.
pub struct SsTable;

impl SsTable {
    pub fn new() -> Self {
        Self
    }
}

impl ConnectionTable for SsTable {
    async fn find_by_port(&self, port: u16) -> Result<Vec<ConnectionRecord>> {
        // -H no header, -t/-u tcp and udp, -a all states, -n numeric, -p owning process
        let output = command::run("ss", &["-Htanup"]).await?;
        Ok(parse::parse_ss(&output, port))
    }
}
