use crate::process::{write_unbuffered, ProcessError};

use nix::sys::signal::{sigaction, signal, SaFlags, SigAction, SigHandler, SigSet, Signal};
use signal_hook::consts::SIGTSTP;
use signal_hook::iterator::Signals;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::debug;

const ENTER_NOTICE: &[u8] = b"\nEntering foreground-only mode (& is now ignored)\n";
const EXIT_NOTICE: &[u8] = b"\nExiting foreground-only mode\n";

/// Interpreter-wide foreground-only switch. Flipped by the SIGTSTP listener,
/// read on every spawn decision.
#[derive(Debug, Clone, Default)]
pub struct ForegroundMode {
    enabled: Arc<AtomicBool>,
}

impl ForegroundMode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Flips the mode and returns the new value.
    pub fn toggle(&self) -> bool {
        !self.enabled.fetch_xor(true, Ordering::SeqCst)
    }
}

pub fn notice(enabled: bool) -> &'static [u8] {
    if enabled {
        ENTER_NOTICE
    } else {
        EXIT_NOTICE
    }
}

/// Ignores SIGINT at the interpreter level and starts a listener thread that
/// toggles `mode` on every SIGTSTP.
pub fn setup_signal_handlers(mode: &ForegroundMode) -> Result<(), ProcessError> {
    // SAFETY: SIG_IGN installs no handler code.
    unsafe { signal(Signal::SIGINT, SigHandler::SigIgn) }
        .map_err(|e| ProcessError::SignalError(format!("cannot ignore SIGINT: {}", e)))?;

    let mut signals = Signals::new([SIGTSTP])
        .map_err(|e| ProcessError::SignalError(format!("cannot watch SIGTSTP: {}", e)))?;
    let mode = mode.clone();

    thread::Builder::new()
        .name("lash-signals".to_string())
        .spawn(move || {
            for _ in signals.forever() {
                let enabled = mode.toggle();
                write_unbuffered(libc::STDOUT_FILENO, notice(enabled));
                debug!(enabled, "foreground-only mode toggled");
            }
        })?;

    Ok(())
}

/// Runs in the forked child before exec. SIGTSTP is always ignored so only the
/// interpreter reacts to it; SIGINT gets its default action back for
/// foreground commands only.
pub(crate) fn reset_child_dispositions(foreground: bool) {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    // SAFETY: installing SIG_IGN/SIG_DFL runs no handler code.
    unsafe {
        let _ = sigaction(Signal::SIGTSTP, &ignore);
        if foreground {
            let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::all());
            let _ = sigaction(Signal::SIGINT, &default);
        }
    }
}
