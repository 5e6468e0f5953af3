use std::io::{self, Write};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};

mod executor;

use crate::{
    config::Config,
    core::{Flow, Interpreter},
    error::ShellError,
    process::{signal, ForegroundMode},
};

use executor::LineHandler;

pub struct Shell {
    pub(crate) editor: DefaultEditor,
    pub(crate) interpreter: Interpreter,
    pub(crate) prompt: String,
}

impl Shell {
    pub fn new(config: &Config) -> Result<Self, ShellError> {
        let mode = ForegroundMode::new();
        signal::setup_signal_handlers(&mode)?;

        let editor = DefaultEditor::new()?;
        let interpreter = Interpreter::new(config, mode);
        debug!(pid = interpreter.state().identity().as_raw(), "shell started");

        Ok(Shell {
            editor,
            interpreter,
            prompt: config.prompt.clone(),
        })
    }

    pub fn run(&mut self) -> Result<(), ShellError> {
        let mut stdout = io::stdout();

        loop {
            self.interpreter.reap_jobs(&mut stdout)?;

            match self.editor.readline(&self.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                            warn!("couldn't add to history: {}", e);
                        }
                    }

                    if self.handle_line(&line, &mut stdout)? == Flow::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!();
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    self.interpreter.shutdown();
                    break;
                }
                Err(e) => {
                    warn!("readline failed: {}", e);
                    continue;
                }
            }
            stdout.flush()?;
        }
        Ok(())
    }
}
