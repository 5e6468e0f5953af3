use nix::errno::Errno;
use std::fmt;

pub mod executor;
pub mod jobs;
pub mod redirect;
pub mod signal;
pub mod status;

pub use executor::ProcessExecutor;
pub use jobs::JobRegistry;
pub use signal::ForegroundMode;
pub use status::ExitStatus;

#[derive(Debug)]
pub enum ProcessError {
    Fork(Errno),
    Wait(Errno),
    InvalidArgument(String),
    JobLimit(usize),
    SignalError(String),
    Io(std::io::Error),
}

impl ProcessError {
    /// Fork failures leave the interpreter unable to run anything.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProcessError::Fork(_))
    }
}

impl From<std::io::Error> for ProcessError {
    fn from(e: std::io::Error) -> Self {
        ProcessError::Io(e)
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Fork(e) => write!(f, "fork failed: {}", e),
            ProcessError::Wait(e) => write!(f, "wait failed: {}", e),
            ProcessError::InvalidArgument(arg) => {
                write!(f, "argument contains a NUL byte: {:?}", arg)
            }
            ProcessError::JobLimit(limit) => {
                write!(f, "too many background jobs (limit {})", limit)
            }
            ProcessError::SignalError(msg) => write!(f, "Signal error: {}", msg),
            ProcessError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ProcessError {}

/// Writes straight to a file descriptor, bypassing std's buffered and locked
/// handles. Safe to call from a freshly forked child or a signal listener.
pub(crate) fn write_unbuffered(fd: std::os::unix::io::RawFd, mut bytes: &[u8]) {
    while !bytes.is_empty() {
        // SAFETY: the pointer and length come from a live slice.
        let written = unsafe { libc::write(fd, bytes.as_ptr().cast(), bytes.len()) };
        if written < 0 {
            if Errno::last() == Errno::EINTR {
                continue;
            }
            return;
        }
        bytes = &bytes[written as usize..];
    }
}
