use nix::unistd::Pid;

use crate::process::{ExitStatus, ForegroundMode, JobRegistry};

/// Everything the interpreter carries from one line to the next.
#[derive(Debug)]
pub struct ShellState {
    identity: Pid,
    mode: ForegroundMode,
    pub last_status: ExitStatus,
    pub jobs: JobRegistry,
}

impl ShellState {
    pub fn new(identity: Pid, mode: ForegroundMode, max_jobs: usize) -> Self {
        Self {
            identity,
            mode,
            last_status: ExitStatus::default(),
            jobs: JobRegistry::new(max_jobs),
        }
    }

    /// The interpreter's own pid, fixed at startup.
    pub fn identity(&self) -> Pid {
        self.identity
    }

    pub fn mode(&self) -> &ForegroundMode {
        &self.mode
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self::new(nix::unistd::getpid(), ForegroundMode::new(), 500)
    }

    #[cfg(test)]
    pub(crate) fn with_job_capacity(mut self, capacity: usize) -> Self {
        self.jobs = JobRegistry::new(capacity);
        self
    }
}
