//! Best-effort restart signal for the wolgate daemon

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Control script installed alongside the daemon.
pub fn rc_script_path() -> PathBuf {
    PathBuf::from("/etc/rc.d/rc.wolgate")
}

/// Ask the daemon to pick up new settings.
///
/// Fire-and-forget: output is discarded, the exit status is not checked,
/// and a missing control script is not an error. Returns whether an
/// invocation was attempted; callers must never let a failed restart turn
/// a completed save into a failure.
pub fn request_restart(script: &Path) -> bool {
    if !script.is_file() {
        log::debug!(
            "daemon control script {} not installed, skipping restart",
            script.display()
        );
        return false;
    }

    match Command::new(script)
        .arg("restart")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) => log::debug!("daemon restart requested (exit: {})", status),
        Err(e) => log::warn!("daemon restart invocation failed: {}", e),
    }
    true
}
