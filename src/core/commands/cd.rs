use super::{Command, CommandError};
use crate::core::state::ShellState;
use crate::core::Flow;
use std::env;
use std::io::Write;
use std::path::PathBuf;

#[derive(Clone, Default)]
pub struct CdCommand;

impl CdCommand {
    pub fn new() -> Self {
        Self
    }

    fn home_dir() -> Option<PathBuf> {
        env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
    }
}

impl Command for CdCommand {
    fn execute(
        &self,
        args: &[String],
        _state: &mut ShellState,
        out: &mut dyn Write,
    ) -> Result<Flow, CommandError> {
        let target = match args.first() {
            Some(path) => PathBuf::from(path),
            None => match Self::home_dir() {
                Some(home) => home,
                None => {
                    writeln!(out, "cd: HOME not set")?;
                    return Ok(Flow::Continue);
                }
            },
        };

        if env::set_current_dir(&target).is_err() {
            writeln!(out, "{}: no such file or directory", target.display())?;
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    // Working directory and HOME are process-wide, so every cd scenario lives
    // in this one test.
    #[test]
    fn test_cd_scenarios() {
        let cmd = CdCommand::new();
        let mut state = ShellState::for_tests();
        let original = env::current_dir().unwrap();
        let original_home = env::var_os("HOME");

        let home = env::temp_dir().join(format!("lash_cd_home_{}", std::process::id()));
        fs::create_dir_all(&home).unwrap();
        let home = home.canonicalize().unwrap();
        env::set_var("HOME", &home);

        // No argument goes to $HOME.
        let mut out = Vec::new();
        cmd.execute(&[], &mut state, &mut out).unwrap();
        assert_eq!(env::current_dir().unwrap(), home);
        assert!(out.is_empty());

        // Explicit path.
        let temp = env::temp_dir().canonicalize().unwrap();
        cmd.execute(&[temp.to_string_lossy().into_owned()], &mut state, &mut out)
            .unwrap();
        assert_eq!(env::current_dir().unwrap(), temp);

        // Bad path reports and leaves the directory alone.
        let flow = cmd
            .execute(&["/nonexistent/lash".to_string()], &mut state, &mut out)
            .unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(env::current_dir().unwrap(), temp);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "/nonexistent/lash: no such file or directory\n"
        );

        match original_home {
            Some(value) => env::set_var("HOME", value),
            None => env::remove_var("HOME"),
        }
        env::set_current_dir(original).unwrap();
        let _ = fs::remove_dir(home);
    }
}
