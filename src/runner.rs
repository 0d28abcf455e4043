//! Subprocess runner
//!
//! Executes invocations with `std::process::Command`. Child stderr is
//! inherited so tool diagnostics reach the operator unmodified; stdout is
//! either discarded ("run") or captured for parsing ("capture"). Each
//! command line is traced to stdout before it executes.

use std::io;
use std::process::{Command, Stdio};

use crate::invocation::Invocation;

/// What to do when a subprocess fails.
///
/// Setup, import and export steps are `Fatal`: the operation aborts on the
/// first failure. Delete steps are `BestEffort`: the failure is logged and
/// the operation carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    Fatal,
    BestEffort,
}

/// Runs invocations as child processes.
#[derive(Debug, Clone, Default)]
pub struct Runner;

impl Runner {
    pub fn new() -> Self {
        Self
    }

    /// Execute an invocation, discarding stdout.
    ///
    /// Returns `Ok(true)` on success. Under `BestEffort` a failure is logged
    /// and reported as `Ok(false)`; under `Fatal` it is returned as an error.
    pub fn run(&self, inv: &Invocation, policy: FailurePolicy) -> Result<bool, RunnerError> {
        println!("Command line: {}", inv.command_line());

        let result = Command::new(&inv.program)
            .args(&inv.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()
            .map_err(|source| RunnerError::Spawn {
                command: inv.command_line(),
                source,
            })
            .and_then(|status| {
                if status.success() {
                    Ok(())
                } else {
                    Err(RunnerError::Exit {
                        command: inv.command_line(),
                        code: status.code(),
                    })
                }
            });

        match result {
            Ok(()) => Ok(true),
            Err(err) => match policy {
                FailurePolicy::Fatal => Err(err),
                FailurePolicy::BestEffort => {
                    eprintln!("Error: {}", err);
                    Ok(false)
                }
            },
        }
    }

    /// Execute an invocation and return its stdout. Always fatal on failure:
    /// capture output feeds a parser, so there is nothing to continue with.
    pub fn capture(&self, inv: &Invocation) -> Result<Vec<u8>, RunnerError> {
        println!("Command line: {}", inv.command_line());

        let output = Command::new(&inv.program)
            .args(&inv.args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| RunnerError::Spawn {
                command: inv.command_line(),
                source,
            })?;

        if !output.status.success() {
            return Err(RunnerError::Exit {
                command: inv.command_line(),
                code: output.status.code(),
            });
        }

        Ok(output.stdout)
    }
}

/// Subprocess execution errors
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to launch `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("command `{command}` exited with status {code:?}")]
    Exit { command: String, code: Option<i32> },
}
