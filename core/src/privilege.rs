//! Elevated-privilege detection.
//!
//! Informational only: the campaign runs either way, but without elevation
//! other users' processes may survive every attempt.

/// Whether this process runs as root.
#[cfg(unix)]
pub async fn is_elevated() -> bool {
    nix::unistd::geteuid().is_root()
}

/// Whether this process runs as administrator.
///
/// `net session` only succeeds from an elevated token.
#[cfg(windows)]
pub async fn is_elevated() -> bool {
    crate::adapters::command_succeeds("net", &["session"]).await
}

#[cfg(not(any(unix, windows)))]
pub async fn is_elevated() -> bool {
    false
}
