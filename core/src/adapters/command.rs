//! Helper for running directory-query commands.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Run `program` and return its stdout.
///
/// A non-zero exit status is not an error: tools like `lsof` exit 1 when
/// nothing matches, which callers treat as an empty table. Only a failure
/// to spawn is reported.
pub(crate) async fn run(program: &str, args: &[&str]) -> Result<String> {
    debug!(program = program, ?args, "Running query command");

    let output = Command::new(program)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::CommandFailed(format!("Failed to run {}: {}", program, e)))?;

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run `program` and report whether it exited successfully.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) async fn succeeds(program: &str, args: &[&str]) -> Result<bool> {
    let status = Command::new(program)
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| Error::CommandFailed(format!("Failed to run {}: {}", program, e)))?;

    Ok(status.success())
}
