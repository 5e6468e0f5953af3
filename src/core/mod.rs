pub mod commands;
pub mod interpreter;
pub mod state;

pub use interpreter::Interpreter;
pub use state::ShellState;

/// What the read loop should do after a line has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}
