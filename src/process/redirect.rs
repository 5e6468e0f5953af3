use crate::parser::ParsedCommand;
use crate::process::{write_unbuffered, ProcessError};

use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2};
use std::ffi::CString;
use std::os::unix::io::RawFd;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Input,
    Output,
}

impl Stream {
    fn fd(self) -> RawFd {
        match self {
            Stream::Input => libc::STDIN_FILENO,
            Stream::Output => libc::STDOUT_FILENO,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Stream::Input => "input",
            Stream::Output => "output",
        }
    }

    fn flags(self) -> OFlag {
        match self {
            Stream::Input => OFlag::O_RDONLY,
            Stream::Output => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
        }
    }
}

/// One stream rebinding, fully prepared before fork so the child only has to
/// make system calls.
#[derive(Debug)]
pub struct Redirect {
    stream: Stream,
    path: CString,
    failure: String,
}

impl Redirect {
    fn new(stream: Stream, path: &str) -> Result<Self, ProcessError> {
        let c_path =
            CString::new(path).map_err(|_| ProcessError::InvalidArgument(path.to_string()))?;
        Ok(Redirect {
            stream,
            path: c_path,
            failure: format!("cannot open {} for {}\n", path, stream.label()),
        })
    }

    #[cfg(test)]
    fn stream(&self) -> Stream {
        self.stream
    }

    #[cfg(test)]
    fn path(&self) -> &str {
        self.path.to_str().unwrap_or_default()
    }

    #[cfg(test)]
    fn failure_message(&self) -> &str {
        &self.failure
    }

    /// Opens the target and binds it over stdin/stdout. On failure the
    /// error has already been reported on stderr.
    pub(crate) fn apply(&self) -> Result<(), ()> {
        // rw-r--r--
        let mode = Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IROTH;
        let fd = match open(self.path.as_c_str(), self.stream.flags(), mode) {
            Ok(fd) => fd,
            Err(_) => {
                write_unbuffered(libc::STDERR_FILENO, self.failure.as_bytes());
                return Err(());
            }
        };

        let target = self.stream.fd();
        if fd != target {
            if dup2(fd, target).is_err() {
                write_unbuffered(libc::STDERR_FILENO, self.failure.as_bytes());
                return Err(());
            }
            let _ = close(fd);
        }
        Ok(())
    }
}

/// Which streams a spawned process gets rebound, and to what.
#[derive(Debug, Default)]
pub struct RedirectPlan {
    input: Option<Redirect>,
    output: Option<Redirect>,
}

impl RedirectPlan {
    /// `background` is the effective decision: a background request while
    /// foreground-only mode is off. Such processes get their unspecified
    /// streams bound to `null_device`.
    pub fn new(
        command: &ParsedCommand,
        background: bool,
        null_device: &Path,
    ) -> Result<Self, ProcessError> {
        let fallback = null_device.to_string_lossy();
        let pick = |explicit: Option<&str>, stream: Stream| match explicit {
            Some(path) => Redirect::new(stream, path).map(Some),
            None if background => Redirect::new(stream, &fallback).map(Some),
            None => Ok(None),
        };

        Ok(RedirectPlan {
            input: pick(command.input.as_deref(), Stream::Input)?,
            output: pick(command.output.as_deref(), Stream::Output)?,
        })
    }

    #[cfg(test)]
    fn input(&self) -> Option<&Redirect> {
        self.input.as_ref()
    }

    #[cfg(test)]
    fn output(&self) -> Option<&Redirect> {
        self.output.as_ref()
    }

    /// Input first, then output. Stops at the first target that fails.
    pub(crate) fn apply(&self) -> Result<(), ()> {
        if let Some(input) = &self.input {
            input.apply()?;
        }
        if let Some(output) = &self.output {
            output.apply()?;
        }
        Ok(())
    }
}
