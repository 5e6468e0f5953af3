use std::io::Write;

use super::Shell;
use crate::core::Flow;
use crate::error::ShellError;

pub(crate) trait LineHandler {
    /// Runs one line. Recoverable errors are reported and swallowed; only
    /// fatal ones come back.
    fn handle_line(&mut self, line: &str, out: &mut dyn Write) -> Result<Flow, ShellError>;
}

impl LineHandler for Shell {
    fn handle_line(&mut self, line: &str, out: &mut dyn Write) -> Result<Flow, ShellError> {
        match self.interpreter.execute_line(line, out) {
            Ok(flow) => Ok(flow),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                eprintln!("lash: {}", e);
                Ok(Flow::Continue)
            }
        }
    }
}
