//! Error types for the devsweep-core library.

use thiserror::Error;

/// Result type alias for devsweep operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while querying or signalling processes.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to execute a system command.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// Failed to deliver a termination signal.
    #[error("Failed to signal process {pid}: {reason}")]
    SignalFailed { pid: u32, reason: String },

    /// A command-line pattern could not be compiled.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::SignalFailed {
            pid: 1234,
            reason: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("1234"));
        assert!(err.to_string().contains("permission denied"));

        let err = Error::InvalidPattern {
            pattern: "(".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert!(err.to_string().contains("'('"));
    }
}
