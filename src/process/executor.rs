use std::ffi::CString;
use std::io::Write;
use std::path::PathBuf;

use nix::errno::Errno;
use nix::sys::wait::waitpid;
use nix::unistd::{execvp, fork, ForkResult, Pid};
use tracing::debug;

use super::redirect::RedirectPlan;
use super::{signal, write_unbuffered, ExitStatus, ProcessError};
use crate::core::state::ShellState;
use crate::parser::ParsedCommand;

pub const DEFAULT_NULL_DEVICE: &str = "/dev/null";

/// Runs external programs: fork, wire up the child, exec, and either track
/// or wait on the result.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    null_device: PathBuf,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new(PathBuf::from(DEFAULT_NULL_DEVICE))
    }
}

impl ProcessExecutor {
    pub fn new(null_device: PathBuf) -> Self {
        Self { null_device }
    }

    pub fn spawn_process(
        &self,
        command: &ParsedCommand,
        state: &mut ShellState,
        out: &mut dyn Write,
    ) -> Result<(), ProcessError> {
        if command.is_empty() {
            return Ok(());
        }

        // Sampled once so the child and parent agree on the decision.
        let foreground_only = state.mode().is_enabled();
        let background = command.background && !foreground_only;

        if background && state.jobs.is_full() {
            return Err(ProcessError::JobLimit(state.jobs.capacity()));
        }

        let argv = command
            .args
            .iter()
            .map(|arg| {
                CString::new(arg.as_str()).map_err(|_| ProcessError::InvalidArgument(arg.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let plan = RedirectPlan::new(command, background, &self.null_device)?;

        // Anything still buffered would otherwise be owned by both processes.
        out.flush()?;
        std::io::stdout().flush()?;

        // SAFETY: the child branch only makes async-signal-safe calls before
        // exec or _exit; everything it needs was allocated above.
        match unsafe { fork() } {
            Err(e) => Err(ProcessError::Fork(e)),
            Ok(ForkResult::Child) => run_child(&argv, &plan, !background),
            Ok(ForkResult::Parent { child }) => {
                if background {
                    state.jobs.register(child)?;
                    writeln!(out, "background pid is {}", child)?;
                    out.flush()?;
                } else {
                    debug!(pid = child.as_raw(), "waiting for foreground process");
                    let status = wait_foreground(child)?;
                    state.last_status = status;
                    if status.is_signaled() {
                        writeln!(out, "{}", status)?;
                        out.flush()?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// Leaves the forked child without running atexit hooks or flushing std
/// buffers it shares with the interpreter.
fn exit_child(code: i32) -> ! {
    // SAFETY: _exit only terminates the calling process.
    unsafe { libc::_exit(code) }
}

fn run_child(argv: &[CString], plan: &RedirectPlan, foreground: bool) -> ! {
    signal::reset_child_dispositions(foreground);

    if plan.apply().is_err() {
        exit_child(1);
    }

    // execvp only returns on failure.
    let err = match execvp(&argv[0], argv) {
        Err(e) => e,
        Ok(never) => match never {},
    };
    write_unbuffered(libc::STDERR_FILENO, argv[0].as_bytes());
    write_unbuffered(libc::STDERR_FILENO, b": ");
    write_unbuffered(libc::STDERR_FILENO, err.desc().as_bytes());
    write_unbuffered(libc::STDERR_FILENO, b"\n");
    exit_child(1);
}

/// Blocks until `pid` terminates. Interrupted waits are resumed.
fn wait_foreground(pid: Pid) -> Result<ExitStatus, ProcessError> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => {
                if let Some(exit) = ExitStatus::from_wait(status) {
                    debug!(pid = pid.as_raw(), %exit, "foreground process finished");
                    return Ok(exit);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(ProcessError::Wait(e)),
        }
    }
}
