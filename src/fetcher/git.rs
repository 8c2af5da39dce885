//! Shallow git checkout of a pinned ref.

use crate::error::ResolveError;
use std::path::Path;
use std::process::Command;

/// Clone `url` at `gitref` (branch, tag, or revision) into `target` with
/// fetch depth 1. Subprocess output is captured and attached to the error on
/// failure; a non-zero exit (bad ref, unreachable remote) is a fetch error.
pub fn clone_shallow(url: &str, gitref: &str, target: &Path) -> Result<(), ResolveError> {
    tracing::info!(%url, %gitref, target = %target.display(), "cloning repository");
    let output = Command::new("git")
        .args(["clone", "--depth", "1", url])
        .arg(target)
        .args(["-b", gitref])
        .output()
        .map_err(|e| ResolveError::fetch(url, format!("failed to run git: {}", e)))?;

    // stderr is merged into the diagnostic output; git writes progress there.
    let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
    log.push_str(&String::from_utf8_lossy(&output.stderr));

    if !output.status.success() {
        return Err(ResolveError::fetch(
            url,
            format!("git clone exited with {}: {}", output.status, log.trim()),
        ));
    }
    tracing::debug!(%url, "clone finished: {}", log.trim());
    Ok(())
}
