//! Remote command execution.

use crate::{HalError, HalResult};

/// Captured result of a command run on the target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs shell command lines on the target.
pub trait CommandOps {
    /// Run a command and report its outcome; a non-zero exit is not an error.
    ///
    /// Failing to launch the command at all (missing program, timeout) is still an error.
    fn run(&self, cmd: &str) -> HalResult<CommandOutput>;

    /// Run a command and fail with [`HalError::CommandFailed`] on a non-zero exit.
    fn run_check(&self, cmd: &str) -> HalResult<CommandOutput> {
        let output = self.run(cmd)?;
        if !output.is_success() {
            return Err(command_failed(cmd, &output));
        }
        Ok(output)
    }
}

/// Program name of a command line, used to label failures.
pub(crate) fn program_of(cmd: &str) -> &str {
    cmd.split_whitespace().next().unwrap_or(cmd)
}

pub(crate) fn command_failed(cmd: &str, output: &CommandOutput) -> HalError {
    HalError::CommandFailed {
        program: program_of(cmd).to_string(),
        code: output.code,
        stderr: output.stderr.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(CommandOutput);

    impl CommandOps for Canned {
        fn run(&self, _cmd: &str) -> HalResult<CommandOutput> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn run_check_passes_success_through() {
        let ops = Canned(CommandOutput {
            code: Some(0),
            stdout: "ok\n".to_string(),
            stderr: String::new(),
        });
        assert_eq!(ops.run_check("true").unwrap().stdout, "ok\n");
    }

    #[test]
    fn run_check_maps_non_zero_exit() {
        let ops = Canned(CommandOutput {
            code: Some(32),
            stdout: String::new(),
            stderr: "mount: /mnt: special device /dev/loop0p1 does not exist.\n".to_string(),
        });

        assert!(ops.run("mount /dev/loop0p1 /mnt/").is_ok());
        let err = ops.run_check("mount /dev/loop0p1 /mnt/").unwrap_err();
        match err {
            HalError::CommandFailed {
                program,
                code,
                stderr,
            } => {
                assert_eq!(program, "mount");
                assert_eq!(code, Some(32));
                assert!(stderr.ends_with("does not exist."));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn signal_exit_is_not_success() {
        let output = CommandOutput {
            code: None,
            ..CommandOutput::default()
        };
        assert!(!output.is_success());
        assert!(CommandOutput::success().is_success());
    }
}
