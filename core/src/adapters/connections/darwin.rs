//! macOS/BSD connection table using `lsof`.

use crate::adapters::command;
use crate::adapters::parse;
use crate::domain::ConnectionRecord;
use crate::error::Result;

use super::ConnectionTable;

/// Connection table backed by `lsof -nP -i :PORT`.
pub struct LsofTable;

impl LsofTable {
    pub fn new() -> Self {
        Self
    }
}

impl ConnectionTable for LsofTable {
    async fn find_by_port(&self, port: u16) -> Result<Vec<ConnectionRecord>> {
        let selector = format!(":{}", port);
        let output = command::run("lsof", &["-nP", "-i", &selector]).await?;
        Ok(parse::parse_lsof(&output, port))
    }
}
