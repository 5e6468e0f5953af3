use std::fmt;

mod expander;
mod tokenizer;

pub use expander::PidExpander;
pub use tokenizer::{ParsedCommand, Tokenizer, DEFAULT_MAX_ARGS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    MissingRedirectTarget(&'static str),
    TooManyArguments(usize),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingRedirectTarget(op) => {
                write!(f, "syntax error: expected a path after `{}`", op)
            }
            ParseError::TooManyArguments(limit) => {
                write!(f, "too many arguments (limit {})", limit)
            }
        }
    }
}

impl std::error::Error for ParseError {}
