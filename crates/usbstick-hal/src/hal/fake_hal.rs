//! Fake HAL implementation for testing.
//!
//! This implementation records all operations without executing them,
//! allowing the controller to be tested without a board attached.

use super::command_ops::command_failed;
use crate::path::default_local_destination;
use crate::{CommandOps, CommandOutput, FileTransferOps, HalError, HalResult};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Operation records for testing and verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Run { command: String },
    RunCheck { command: String },
    Put { local: PathBuf, remote: String },
    Get { remote: String, local: Option<PathBuf> },
}

impl Operation {
    /// The command line for `Run`/`RunCheck` records.
    pub fn command(&self) -> Option<&str> {
        match self {
            Operation::Run { command } | Operation::RunCheck { command } => Some(command),
            _ => None,
        }
    }
}

/// Shared state for FakeHal operations.
#[derive(Debug, Default)]
struct FakeHalState {
    /// All operations that were recorded
    operations: Vec<Operation>,
    /// Commands containing any of these substrings exit with status 1
    failing_commands: Vec<String>,
    /// Whether put/get fail after being recorded
    fail_transfers: bool,
}

/// Fake HAL implementation that records operations without executing them.
///
/// Clones share the same record, so a test can hand one clone to the controller and inspect
/// the other.
#[derive(Debug, Clone, Default)]
pub struct FakeHal {
    state: Arc<Mutex<FakeHalState>>,
}

impl FakeHal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeHalState> {
        // A panicking test thread must not hide the record from the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<Operation> {
        self.lock().operations.clone()
    }

    /// Command lines of all recorded `Run`/`RunCheck` operations, in order.
    pub fn commands(&self) -> Vec<String> {
        self.lock()
            .operations
            .iter()
            .filter_map(|op| op.command().map(String::from))
            .collect()
    }

    /// Get the number of operations recorded.
    pub fn operation_count(&self) -> usize {
        self.lock().operations.len()
    }

    /// Check if a specific operation was recorded.
    pub fn has_operation(&self, check: impl Fn(&Operation) -> bool) -> bool {
        self.lock().operations.iter().any(check)
    }

    /// Clear recorded operations; injected failures stay armed.
    pub fn clear(&self) {
        self.lock().operations.clear();
    }

    /// Make every command containing `pattern` exit with status 1.
    pub fn fail_command(&self, pattern: impl Into<String>) {
        self.lock().failing_commands.push(pattern.into());
    }

    /// Make every subsequent transfer fail.
    pub fn fail_transfers(&self, fail: bool) {
        self.lock().fail_transfers = fail;
    }

    fn record_operation(&self, op: Operation) {
        self.lock().operations.push(op);
    }

    fn outcome(&self, cmd: &str) -> CommandOutput {
        let failing = self
            .lock()
            .failing_commands
            .iter()
            .any(|pattern| cmd.contains(pattern.as_str()));
        if failing {
            CommandOutput {
                code: Some(1),
                stdout: String::new(),
                stderr: format!("injected failure: {}", cmd),
            }
        } else {
            CommandOutput::success()
        }
    }

    fn transfer_result(&self, from: &str, to: &str) -> HalResult<()> {
        if self.lock().fail_transfers {
            return Err(HalError::TransferFailed {
                from: from.to_string(),
                to: to.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl CommandOps for FakeHal {
    fn run(&self, cmd: &str) -> HalResult<CommandOutput> {
        log::info!("FAKE HAL: run {}", cmd);
        self.record_operation(Operation::Run {
            command: cmd.to_string(),
        });
        Ok(self.outcome(cmd))
    }

    fn run_check(&self, cmd: &str) -> HalResult<CommandOutput> {
        log::info!("FAKE HAL: run_check {}", cmd);
        self.record_operation(Operation::RunCheck {
            command: cmd.to_string(),
        });
        let output = self.outcome(cmd);
        if !output.is_success() {
            return Err(command_failed(cmd, &output));
        }
        Ok(output)
    }
}

impl FileTransferOps for FakeHal {
    fn put(&self, local: &Path, remote: &str) -> HalResult<()> {
        log::info!("FAKE HAL: put {} -> {}", local.display(), remote);
        self.record_operation(Operation::Put {
            local: local.to_path_buf(),
            remote: remote.to_string(),
        });
        self.transfer_result(&local.display().to_string(), remote)
    }

    fn get(&self, remote: &str, local: Option<&Path>) -> HalResult<PathBuf> {
        log::info!("FAKE HAL: get {}", remote);
        self.record_operation(Operation::Get {
            remote: remote.to_string(),
            local: local.map(Path::to_path_buf),
        });
        let landed = match local {
            Some(path) => path.to_path_buf(),
            None => default_local_destination(remote)
                .ok_or_else(|| HalError::Other(format!("no file name in {}", remote)))?,
        };
        self.transfer_result(remote, &landed.display().to_string())?;
        Ok(landed)
    }
}
