//! Shared helpers for the ffmpeg-backed device sources.

use std::process::{Command, Stdio};

#[cfg(feature = "camera")]
use crate::error::{Error, Result};

/// Check if a command exists by running `which`.
pub fn command_exists(name: &str) -> bool {
    Command::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run `ffmpeg` with the given arguments and return its raw stdout.
///
/// A missing binary, a failed spawn, or a non-zero exit all surface as
/// [`Error::Device`] so they abort seeding.
#[cfg(feature = "camera")]
pub fn run_ffmpeg(args: &[&str]) -> Result<Vec<u8>> {
    let output = Command::new("ffmpeg")
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| Error::Device(format!("cannot run ffmpeg: {e}")))?;

    if !output.status.success() {
        return Err(Error::Device(format!(
            "ffmpeg exited with {}",
            output.status
        )));
    }
    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_exists_true() {
        assert!(command_exists("echo"));
    }

    #[test]
    fn command_exists_false() {
        assert!(!command_exists("nonexistent_binary_xyz_12345"));
    }
}
