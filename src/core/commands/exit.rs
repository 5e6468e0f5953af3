use super::{Command, CommandError};
use crate::core::state::ShellState;
use crate::core::Flow;
use std::io::Write;

/// Kills every background job and asks the loop to stop. Arguments are
/// ignored; the interpreter always exits with 0.
#[derive(Clone, Default)]
pub struct ExitCommand;

impl ExitCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for ExitCommand {
    fn execute(
        &self,
        _args: &[String],
        state: &mut ShellState,
        _out: &mut dyn Write,
    ) -> Result<Flow, CommandError> {
        state.jobs.teardown();
        Ok(Flow::Exit)
    }
}
