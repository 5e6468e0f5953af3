use crate::process::{ExitStatus, ProcessError};

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use std::io::{self, Write};
use tracing::{debug, warn};

pub const DEFAULT_MAX_JOBS: usize = 500;

/// Background children that have not been reaped yet, in launch order.
#[derive(Debug)]
pub struct JobRegistry {
    jobs: Vec<Pid>,
    capacity: usize,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_JOBS)
    }
}

impl JobRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            jobs: Vec::new(),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.jobs.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.jobs.contains(&pid)
    }

    pub fn pids(&self) -> &[Pid] {
        &self.jobs
    }

    pub fn register(&mut self, pid: Pid) -> Result<(), ProcessError> {
        if self.contains(pid) {
            return Ok(());
        }
        if self.is_full() {
            return Err(ProcessError::JobLimit(self.capacity));
        }
        self.jobs.push(pid);
        debug!(pid = pid.as_raw(), jobs = self.jobs.len(), "background job registered");
        Ok(())
    }

    /// Non-blocking sweep over every tracked job. Finished jobs are reported
    /// on `out` and dropped; the rest keep their order.
    pub fn poll(&mut self, out: &mut dyn Write) -> io::Result<Vec<(Pid, ExitStatus)>> {
        let mut finished = Vec::new();
        let mut still_running = Vec::with_capacity(self.jobs.len());

        for &pid in &self.jobs {
            match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::StillAlive) => still_running.push(pid),
                Ok(status) => match ExitStatus::from_wait(status) {
                    Some(exit) => {
                        // Already reaped, so ESRCH is the usual outcome here.
                        let _ = kill(pid, Signal::SIGKILL);
                        finished.push((pid, exit));
                    }
                    None => still_running.push(pid),
                },
                Err(Errno::ECHILD) => {
                    debug!(pid = pid.as_raw(), "tracked pid is no longer a child, dropping");
                }
                Err(e) => {
                    warn!(pid = pid.as_raw(), error = %e, "waitpid failed");
                    still_running.push(pid);
                }
            }
        }

        self.jobs = still_running;

        for (pid, status) in &finished {
            writeln!(out, "background pid {} is done: {}", pid, status)?;
        }
        out.flush()?;

        Ok(finished)
    }

    /// Sends SIGKILL to every tracked job without waiting for it.
    pub fn teardown(&mut self) {
        for pid in self.jobs.drain(..) {
            if let Err(e) = kill(pid, Signal::SIGKILL) {
                debug!(pid = pid.as_raw(), error = %e, "kill during teardown failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use std::thread;
    use std::time::Duration;

    fn spawn(program: &str, args: &[&str]) -> Pid {
        let child = Command::new(program).args(args).spawn().unwrap();
        Pid::from_raw(child.id() as i32)
    }

    fn poll_until_done(registry: &mut JobRegistry, out: &mut Vec<u8>) -> Vec<(Pid, ExitStatus)> {
        for _ in 0..200 {
            let done = registry.poll(out).unwrap();
            if !done.is_empty() {
                return done;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("background job never finished");
    }

    #[test]
    fn test_register_rejects_duplicates_and_overflow() {
        let mut registry = JobRegistry::new(2);
        registry.register(Pid::from_raw(100)).unwrap();
        registry.register(Pid::from_raw(100)).unwrap();
        assert_eq!(registry.len(), 1);

        registry.register(Pid::from_raw(101)).unwrap();
        assert!(registry.is_full());
        assert!(matches!(
            registry.register(Pid::from_raw(102)),
            Err(ProcessError::JobLimit(2))
        ));
        assert_eq!(registry.pids(), &[Pid::from_raw(100), Pid::from_raw(101)]);
    }

    #[test]
    fn test_poll_without_completions_is_silent() {
        let mut registry = JobRegistry::default();
        let pid = spawn("sleep", &["5"]);
        registry.register(pid).unwrap();

        let mut out = Vec::new();
        assert!(registry.poll(&mut out).unwrap().is_empty());
        assert!(registry.poll(&mut out).unwrap().is_empty());
        assert!(out.is_empty());
        assert_eq!(registry.pids(), &[pid]);

        registry.teardown();
        let _ = waitpid(pid, None);
    }

    #[test]
    fn test_poll_reports_and_removes_finished_job() {
        let mut registry = JobRegistry::default();
        let sleeper = spawn("sleep", &["5"]);
        let quick = spawn("sh", &["-c", "exit 4"]);
        registry.register(sleeper).unwrap();
        registry.register(quick).unwrap();

        let mut out = Vec::new();
        let done = poll_until_done(&mut registry, &mut out);

        assert_eq!(done, vec![(quick, ExitStatus::Exited(4))]);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("background pid {} is done: exit value 4\n", quick)
        );
        assert_eq!(registry.pids(), &[sleeper]);

        registry.teardown();
        let _ = waitpid(sleeper, None);
    }

    #[test]
    fn test_teardown_kills_every_job() {
        let mut registry = JobRegistry::default();
        let first = spawn("sleep", &["30"]);
        let second = spawn("sleep", &["30"]);
        registry.register(first).unwrap();
        registry.register(second).unwrap();

        registry.teardown();
        assert!(registry.is_empty());

        for pid in [first, second] {
            let status = waitpid(pid, None).unwrap();
            assert_eq!(
                ExitStatus::from_wait(status),
                Some(ExitStatus::Signaled(Signal::SIGKILL as i32))
            );
        }
    }

    #[test]
    fn test_signal_termination_format() {
        let mut registry = JobRegistry::default();
        let pid = spawn("sleep", &["30"]);
        registry.register(pid).unwrap();
        kill(pid, Signal::SIGTERM).unwrap();

        let mut out = Vec::new();
        poll_until_done(&mut registry, &mut out);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("background pid {} is done: terminated by signal 15\n", pid)
        );
    }
}
