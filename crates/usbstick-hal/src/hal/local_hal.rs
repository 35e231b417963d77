//! Backend for running directly on the target board.

use super::process::output_with_timeout;
use crate::path::default_local_destination;
use crate::{CommandOps, CommandOutput, FileTransferOps, HalError, HalResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs commands through `sh -c` and transfers files with plain copies.
///
/// Used when the harness itself runs on the board that hosts the gadget, so "remote" paths
/// are ordinary local paths.
#[derive(Debug, Clone)]
pub struct LocalHal {
    command_timeout: Duration,
}

impl Default for LocalHal {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalHal {
    pub fn new() -> Self {
        Self {
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }
}

fn copy_file(from: &Path, to: &Path) -> HalResult<()> {
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|err| HalError::TransferFailed {
            from: from.display().to_string(),
            to: to.display().to_string(),
            reason: err.to_string(),
        })
}

impl CommandOps for LocalHal {
    fn run(&self, cmd: &str) -> HalResult<CommandOutput> {
        log::debug!("sh -c {}", cmd);
        let mut child = Command::new("sh");
        child.args(["-c", cmd]);
        output_with_timeout("sh", &mut child, self.command_timeout)
    }
}

impl FileTransferOps for LocalHal {
    fn put(&self, local: &Path, remote: &str) -> HalResult<()> {
        log::debug!("copy {} -> {}", local.display(), remote);
        copy_file(local, Path::new(remote))
    }

    fn get(&self, remote: &str, local: Option<&Path>) -> HalResult<PathBuf> {
        let local = match local {
            Some(path) => path.to_path_buf(),
            None => default_local_destination(remote)
                .ok_or_else(|| HalError::Other(format!("no file name in {}", remote)))?,
        };
        log::debug!("copy {} -> {}", remote, local.display());
        copy_file(Path::new(remote), &local)?;
        Ok(local)
    }
}
