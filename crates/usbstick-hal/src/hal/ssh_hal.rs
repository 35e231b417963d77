//! Target access over `ssh` and `scp`.

use super::command_ops::program_of;
use super::process::output_with_timeout;
use crate::path::default_local_destination;
use crate::{CommandOps, CommandOutput, FileTransferOps, HalError, HalResult};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Where the target board is reachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub host: String,
    pub user: Option<String>,
    pub port: u16,
}

impl SshTarget {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            user: None,
            port: 22,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// `user@host`, or just `host` when no user is configured.
    pub fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, self.host),
            None => self.host.clone(),
        }
    }
}

/// Runs commands with `ssh` and moves files with `scp`.
///
/// Authentication is left to the ssh configuration of the harness; `BatchMode` is forced so a
/// missing key fails fast instead of prompting.
#[derive(Debug, Clone)]
pub struct SshHal {
    target: SshTarget,
    command_timeout: Duration,
    transfer_timeout: Duration,
}

impl SshHal {
    pub fn new(target: SshTarget) -> Self {
        Self {
            target,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            transfer_timeout: DEFAULT_TRANSFER_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, command: Duration, transfer: Duration) -> Self {
        self.command_timeout = command;
        self.transfer_timeout = transfer;
        self
    }

    pub(crate) fn ssh_args(&self, cmd: &str) -> Vec<String> {
        vec![
            "-p".to_string(),
            self.target.port.to_string(),
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            self.target.destination(),
            "--".to_string(),
            cmd.to_string(),
        ]
    }

    pub(crate) fn remote_spec(&self, remote: &str) -> String {
        format!("{}:{}", self.target.destination(), remote)
    }

    fn scp(&self, from: &str, to: &str) -> HalResult<()> {
        let mut cmd = Command::new("scp");
        cmd.args(["-q", "-B", "-P"])
            .arg(self.target.port.to_string())
            .args([from, to]);
        let output = output_with_timeout("scp", &mut cmd, self.transfer_timeout)?;
        if !output.is_success() {
            return Err(HalError::TransferFailed {
                from: from.to_string(),
                to: to.to_string(),
                reason: output.stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}

impl CommandOps for SshHal {
    fn run(&self, cmd: &str) -> HalResult<CommandOutput> {
        log::debug!("ssh {}: {}", self.target.destination(), cmd);
        let mut child = Command::new("ssh");
        child.args(self.ssh_args(cmd));
        output_with_timeout("ssh", &mut child, self.command_timeout).map_err(|err| match err {
            // Report the remote program, not the ssh client, when the command overran.
            HalError::CommandTimeout { timeout_secs, .. } => HalError::CommandTimeout {
                program: program_of(cmd).to_string(),
                timeout_secs,
            },
            other => other,
        })
    }
}

impl FileTransferOps for SshHal {
    fn put(&self, local: &Path, remote: &str) -> HalResult<()> {
        log::debug!("scp {} -> {}", local.display(), self.remote_spec(remote));
        self.scp(&local.display().to_string(), &self.remote_spec(remote))
    }

    fn get(&self, remote: &str, local: Option<&Path>) -> HalResult<PathBuf> {
        let local = match local {
            Some(path) => path.to_path_buf(),
            None => default_local_destination(remote)
                .ok_or_else(|| HalError::Other(format!("no file name in {}", remote)))?,
        };
        log::debug!("scp {} -> {}", self.remote_spec(remote), local.display());
        self.scp(&self.remote_spec(remote), &local.display().to_string())?;
        Ok(local)
    }
}
