use super::{ParseError, PidExpander};

pub const DEFAULT_MAX_ARGS: usize = 512;

const BACKGROUND_MARKER: &str = "&";

/// One input line, split into what to run and how to wire it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    pub args: Vec<String>,
    pub input: Option<String>,
    pub output: Option<String>,
    pub background: bool,
}

impl ParsedCommand {
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Collect,
    ExpectInfile,
    ExpectOutfile,
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    expander: PidExpander,
    max_args: usize,
}

impl Tokenizer {
    pub fn new(expander: PidExpander, max_args: usize) -> Self {
        Self { expander, max_args }
    }

    pub fn parse(&self, line: &str) -> Result<ParsedCommand, ParseError> {
        let mut command = ParsedCommand::default();
        let mut state = State::Collect;

        for raw in line.split_whitespace() {
            let token = self.expander.expand(raw);
            state = match state {
                State::ExpectInfile => {
                    command.input = Some(token.into_owned());
                    State::Collect
                }
                State::ExpectOutfile => {
                    command.output = Some(token.into_owned());
                    State::Collect
                }
                State::Collect if token == "<" => State::ExpectInfile,
                State::Collect if token == ">" => State::ExpectOutfile,
                State::Collect => {
                    command.args.push(token.into_owned());
                    State::Collect
                }
            };
        }

        match state {
            State::ExpectInfile => return Err(ParseError::MissingRedirectTarget("<")),
            State::ExpectOutfile => return Err(ParseError::MissingRedirectTarget(">")),
            State::Collect => {}
        }

        if command.args.last().map(String::as_str) == Some(BACKGROUND_MARKER) {
            command.args.pop();
            command.background = true;
        }

        if command.args.len() > self.max_args {
            return Err(ParseError::TooManyArguments(self.max_args));
        }

        Ok(command)
    }
}
