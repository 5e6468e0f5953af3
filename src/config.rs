use crate::flags::Flags;
use crate::parser::DEFAULT_MAX_ARGS;
use crate::process::executor::DEFAULT_NULL_DEVICE;
use crate::process::jobs::DEFAULT_MAX_JOBS;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const RC_FILE: &str = ".lashrc";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prompt: String,
    pub max_args: usize,
    pub max_jobs: usize,
    pub null_device: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prompt: ": ".to_string(),
            max_args: DEFAULT_MAX_ARGS,
            max_jobs: DEFAULT_MAX_JOBS,
            null_device: PathBuf::from(DEFAULT_NULL_DEVICE),
        }
    }
}

impl Config {
    /// `--config` wins and must exist; otherwise `~/.lashrc` is read if present.
    pub fn load(flags: &Flags) -> Result<Self, ConfigError> {
        if let Some(path) = flags.get_value("config") {
            let path = Path::new(path);
            if !path.exists() {
                return Err(ConfigError::ConfigFileNotFound(path.display().to_string()));
            }
            return Self::from_file(path);
        }

        match dirs::home_dir().map(|home| home.join(RC_FILE)) {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Config::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config = Config::default();
        for (index, line) in content.lines().enumerate() {
            config.process_line(index + 1, line)?;
        }
        Ok(config)
    }

    fn process_line(&mut self, number: usize, line: &str) -> Result<(), ConfigError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let (key, value) = line
            .split_once('=')
            .ok_or(ConfigError::MalformedLine(number))?;
        let key = key.trim();
        let mut value = value.trim();

        // Remove quotes if present
        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            value = &value[1..value.len() - 1];
        }

        match key {
            "prompt" => self.prompt = value.to_string(),
            "max_args" => self.max_args = parse_limit(key, value)?,
            "max_jobs" => self.max_jobs = parse_limit(key, value)?,
            "null_device" => self.null_device = PathBuf::from(value),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn parse_limit(key: &str, value: &str) -> Result<usize, ConfigError> {
    match value.parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(ConfigError::InvalidValue(key.to_string(), value.to_string())),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ConfigFileNotFound(String),
    MalformedLine(usize),
    UnknownKey(String),
    InvalidValue(String, String),
    IoError(std::io::Error),
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ConfigFileNotFound(path) => write!(f, "Config file not found: {}", path),
            ConfigError::MalformedLine(line) => {
                write!(f, "line {}: expected `key = value`", line)
            }
            ConfigError::UnknownKey(key) => write!(f, "unknown setting: {}", key),
            ConfigError::InvalidValue(key, value) => {
                write!(f, "invalid value for {}: {:?}", key, value)
            }
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
