use super::{Command, CommandError};
use crate::core::state::ShellState;
use crate::core::Flow;
use std::io::Write;

#[derive(Clone, Default)]
pub struct StatusCommand;

impl StatusCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for StatusCommand {
    fn execute(
        &self,
        _args: &[String],
        state: &mut ShellState,
        out: &mut dyn Write,
    ) -> Result<Flow, CommandError> {
        writeln!(out, "{}", state.last_status)?;
        out.flush()?;
        Ok(Flow::Continue)
    }
}
