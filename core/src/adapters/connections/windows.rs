//! Windows connection table using `netstat`.

use crate::adapters::command;
use crate::adapters::parse;
use crate::domain::ConnectionRecord;
use crate::error::Result;

use super::ConnectionTable;

/// Connection table backed by `netstat -ano`.
pub struct NetstatTable;

impl NetstatTable {
    pub fn new() -> Self {
        Self
    }
}

impl ConnectionTable for NetstatTable {
    async fn find_by_port(&self, port: u16) -> Result<Vec<ConnectionRecord>> {
        let output = command::run("netstat", &["-ano"]).await?;
        Ok(parse::parse_netstat(&output, port))
    }
}
