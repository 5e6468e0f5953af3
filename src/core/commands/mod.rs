use std::collections::BTreeMap;
use std::io::Write;

mod cd;
mod exit;
mod status;

pub use cd::CdCommand;
pub use exit::ExitCommand;
pub use status::StatusCommand;

use super::state::ShellState;
use super::Flow;
use crate::parser::ParsedCommand;
use crate::process::{ProcessError, ProcessExecutor};

#[derive(Debug)]
pub enum CommandError {
    IoError(std::io::Error),
    ProcessError(ProcessError),
}

impl CommandError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, CommandError::ProcessError(e) if e.is_fatal())
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::IoError(err) => write!(f, "IO error: {}", err),
            CommandError::ProcessError(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::IoError(err)
    }
}

impl From<ProcessError> for CommandError {
    fn from(err: ProcessError) -> Self {
        CommandError::ProcessError(err)
    }
}

/// A built-in: runs inside the interpreter, never forks.
pub trait Command {
    fn execute(
        &self,
        args: &[String],
        state: &mut ShellState,
        out: &mut dyn Write,
    ) -> Result<Flow, CommandError>;
}

#[derive(Clone)]
enum CommandType {
    Cd(CdCommand),
    Exit(ExitCommand),
    Status(StatusCommand),
}

impl Command for CommandType {
    fn execute(
        &self,
        args: &[String],
        state: &mut ShellState,
        out: &mut dyn Write,
    ) -> Result<Flow, CommandError> {
        match self {
            CommandType::Cd(cmd) => cmd.execute(args, state, out),
            CommandType::Exit(cmd) => cmd.execute(args, state, out),
            CommandType::Status(cmd) => cmd.execute(args, state, out),
        }
    }
}

/// Routes a parsed line to a built-in or to the process executor.
#[derive(Clone)]
pub struct CommandExecutor {
    commands: BTreeMap<String, CommandType>,
    process_executor: ProcessExecutor,
}

impl CommandExecutor {
    pub fn new(process_executor: ProcessExecutor) -> Self {
        let mut commands = BTreeMap::new();
        commands.insert("cd".to_string(), CommandType::Cd(CdCommand::new()));
        commands.insert("exit".to_string(), CommandType::Exit(ExitCommand::new()));
        commands.insert(
            "status".to_string(),
            CommandType::Status(StatusCommand::new()),
        );

        Self {
            commands,
            process_executor,
        }
    }

    pub fn execute(
        &self,
        command: &ParsedCommand,
        state: &mut ShellState,
        out: &mut dyn Write,
    ) -> Result<Flow, CommandError> {
        let Some(name) = command.program() else {
            return Ok(Flow::Continue);
        };

        // Built-ins ignore redirection and `&`.
        if let Some(builtin) = self.commands.get(name) {
            builtin.execute(&command.args[1..], state, out)
        } else {
            self.process_executor.spawn_process(command, state, out)?;
            Ok(Flow::Continue)
        }
    }

    #[cfg(test)]
    fn is_builtin(&self, command: &str) -> bool {
        self.commands.contains_key(command)
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new(ProcessExecutor::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ExitStatus;

    fn parsed(args: &[&str]) -> ParsedCommand {
        ParsedCommand {
            args: args.iter().map(|s| s.to_string()).collect(),
            ..ParsedCommand::default()
        }
    }

    #[test]
    fn test_builtin_command_detection() {
        let executor = CommandExecutor::default();

        assert!(executor.is_builtin("cd"));
        assert!(executor.is_builtin("exit"));
        assert!(executor.is_builtin("status"));
        assert!(!executor.is_builtin("Status"));
        assert!(!executor.is_builtin("ls"));
        assert!(!executor.is_builtin(""));
    }

    #[test]
    fn test_empty_command_is_noop() {
        let executor = CommandExecutor::default();
        let mut state = ShellState::for_tests();
        let mut out = Vec::new();

        let flow = executor
            .execute(&ParsedCommand::default(), &mut state, &mut out)
            .unwrap();
        assert_eq!(flow, Flow::Continue);
        assert!(out.is_empty());
    }

    #[test]
    fn test_external_then_status() {
        let executor = CommandExecutor::default();
        let mut state = ShellState::for_tests();
        let mut out = Vec::new();

        executor
            .execute(&parsed(&["sh", "-c", "exit 7"]), &mut state, &mut out)
            .unwrap();
        executor
            .execute(&parsed(&["status"]), &mut state, &mut out)
            .unwrap();

        assert_eq!(state.last_status, ExitStatus::Exited(7));
        assert_eq!(String::from_utf8(out).unwrap(), "exit value 7\n");
    }

    #[test]
    fn test_exit_stops_the_loop() {
        let executor = CommandExecutor::default();
        let mut state = ShellState::for_tests();
        let flow = executor
            .execute(&parsed(&["exit"]), &mut state, &mut Vec::new())
            .unwrap();
        assert_eq!(flow, Flow::Exit);
    }

    #[test]
    fn test_command_error_display() {
        let errors = vec![
            CommandError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "io error",
            )),
            CommandError::ProcessError(ProcessError::JobLimit(500)),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
            assert!(!error.is_fatal());
        }
        assert!(CommandError::ProcessError(ProcessError::Fork(nix::errno::Errno::EAGAIN)).is_fatal());
    }
}
