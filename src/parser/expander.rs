use std::borrow::Cow;

const PID_MARKER: &str = "$$";

/// Replaces the `$$` marker with the interpreter's process id.
#[derive(Debug, Clone)]
pub struct PidExpander {
    identity: String,
}

impl PidExpander {
    pub fn new(pid: i32) -> Self {
        Self {
            identity: pid.to_string(),
        }
    }

    /// Occurrences are matched left to right without overlap, so `$$$` keeps
    /// its trailing `$`.
    pub fn expand<'a>(&self, token: &'a str) -> Cow<'a, str> {
        if token.contains(PID_MARKER) {
            Cow::Owned(token.replace(PID_MARKER, &self.identity))
        } else {
            Cow::Borrowed(token)
        }
    }
}
