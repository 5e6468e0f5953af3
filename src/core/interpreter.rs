use std::io::{self, Write};

use nix::unistd::{getpid, Pid};
use tracing::debug;

use super::commands::CommandExecutor;
use super::state::ShellState;
use super::Flow;
use crate::config::Config;
use crate::error::ShellError;
use crate::parser::{PidExpander, Tokenizer};
use crate::process::{ForegroundMode, ProcessExecutor};

/// Lines starting with `#` are skipped before tokenizing.
pub fn is_comment(line: &str) -> bool {
    line.starts_with('#')
}

/// Turns raw lines into actions. Owns all state that outlives a line.
pub struct Interpreter {
    tokenizer: Tokenizer,
    executor: CommandExecutor,
    state: ShellState,
}

impl Interpreter {
    pub fn new(config: &Config, mode: ForegroundMode) -> Self {
        Self::with_identity(getpid(), config, mode)
    }

    pub fn with_identity(identity: Pid, config: &Config, mode: ForegroundMode) -> Self {
        let tokenizer = Tokenizer::new(PidExpander::new(identity.as_raw()), config.max_args);
        let executor = CommandExecutor::new(ProcessExecutor::new(config.null_device.clone()));
        let state = ShellState::new(identity, mode, config.max_jobs);

        Self {
            tokenizer,
            executor,
            state,
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    #[cfg(test)]
    fn state_mut(&mut self) -> &mut ShellState {
        &mut self.state
    }

    /// Reports and reaps finished background jobs. Run once per cycle,
    /// before reading the next line.
    pub fn reap_jobs(&mut self, out: &mut dyn Write) -> io::Result<()> {
        self.state.jobs.poll(out).map(|_| ())
    }

    pub fn execute_line(&mut self, line: &str, out: &mut dyn Write) -> Result<Flow, ShellError> {
        if is_comment(line) {
            return Ok(Flow::Continue);
        }

        let command = self.tokenizer.parse(line)?;
        if command.is_empty() {
            return Ok(Flow::Continue);
        }

        debug!(?command, "dispatching");
        Ok(self.executor.execute(&command, &mut self.state, out)?)
    }

    /// Kills outstanding background jobs; used when input ends without `exit`.
    pub fn shutdown(&mut self) {
        self.state.jobs.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseError;
    use crate::process::ExitStatus;
    use nix::sys::wait::waitpid;

    fn interpreter() -> Interpreter {
        Interpreter::new(&Config::default(), ForegroundMode::new())
    }

    fn run(shell: &mut Interpreter, line: &str) -> String {
        let mut out = Vec::new();
        shell.execute_line(line, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_comments_and_blank_lines_do_nothing() {
        let mut shell = interpreter();
        shell.state_mut().last_status = ExitStatus::Exited(9);

        for line in ["# exit", "#", "", "   ", "\n", "#sh -c 'exit 1'"] {
            assert_eq!(run(&mut shell, line), "");
        }
        assert_eq!(shell.state().last_status, ExitStatus::Exited(9));
        assert!(shell.state().jobs.is_empty());
    }

    #[test]
    fn test_status_after_foreground_exit() {
        let mut shell = interpreter();
        assert_eq!(run(&mut shell, "status"), "exit value 0\n");
        run(&mut shell, "false");
        assert_eq!(run(&mut shell, "status"), "exit value 1\n");
        run(&mut shell, "true");
        assert_eq!(run(&mut shell, "status"), "exit value 0\n");
    }

    #[test]
    fn test_background_does_not_touch_status() {
        let mut shell = interpreter();
        let launched = run(&mut shell, "false &");
        assert!(launched.starts_with("background pid is "));
        assert_eq!(run(&mut shell, "status"), "exit value 0\n");

        let pid = shell.state().jobs.pids()[0];
        let mut out = Vec::new();
        for _ in 0..200 {
            shell.reap_jobs(&mut out).unwrap();
            if !out.is_empty() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!("background pid {} is done: exit value 1\n", pid)
        );
        assert_eq!(run(&mut shell, "status"), "exit value 0\n");
    }

    #[test]
    fn test_pid_marker_uses_shell_identity() {
        let mut shell = Interpreter::with_identity(
            Pid::from_raw(4321),
            &Config::default(),
            ForegroundMode::new(),
        );
        let path = std::env::temp_dir().join(format!("lash_identity_{}", std::process::id()));
        let line = format!("echo $$ > {}", path.display());

        run(&mut shell, &line);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "4321\n");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_foreground_only_mode_blocks_on_ampersand() {
        let mode = ForegroundMode::new();
        let mut shell = Interpreter::new(&Config::default(), mode.clone());
        mode.toggle();

        assert_eq!(run(&mut shell, "false &"), "");
        assert!(shell.state().jobs.is_empty());
        assert_eq!(shell.state().last_status, ExitStatus::Exited(1));
    }

    #[test]
    fn test_malformed_redirection_is_rejected() {
        let mut shell = interpreter();
        let result = shell.execute_line("cat <", &mut Vec::new());
        assert!(matches!(
            result,
            Err(ShellError::Parse(ParseError::MissingRedirectTarget("<")))
        ));
        assert_eq!(shell.state().last_status, ExitStatus::Exited(0));
    }

    #[test]
    fn test_exit_returns_exit_flow_and_kills_jobs() {
        let mut shell = interpreter();
        run(&mut shell, "sleep 30 &");
        let pid = shell.state().jobs.pids()[0];

        let mut out = Vec::new();
        assert_eq!(shell.execute_line("exit", &mut out).unwrap(), Flow::Exit);
        assert!(shell.state().jobs.is_empty());
        assert!(waitpid(pid, None).is_ok());
    }
}
