use crate::error::ShellError;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Flags {
    flags: HashMap<String, Flag>,
}

#[derive(Debug, Clone)]
pub struct Flag {
    pub short: String,
    pub long: String,
    pub description: String,
    pub takes_value: bool,
    pub value: Option<String>,
}

// name, short, long, takes a value, description
const DEFINITIONS: &[(&str, &str, &str, bool, &str)] = &[
    ("help", "-h", "--help", false, "Print this help message"),
    ("version", "-v", "--version", false, "Show version information"),
    (
        "config",
        "-c",
        "--config",
        true,
        "Read settings from this file instead of ~/.lashrc",
    ),
    ("quiet", "-q", "--quiet", false, "Only report errors"),
    ("debug", "-d", "--debug", false, "Enable debug logging on stderr"),
];

impl Default for Flags {
    fn default() -> Self {
        Self::new()
    }
}

impl Flags {
    pub fn new() -> Self {
        let flags = DEFINITIONS
            .iter()
            .map(|&(name, short, long, takes_value, description)| {
                (
                    name.to_string(),
                    Flag {
                        short: short.to_string(),
                        long: long.to_string(),
                        description: description.to_string(),
                        takes_value,
                        value: None,
                    },
                )
            })
            .collect();

        Flags { flags }
    }

    pub fn parse(&mut self, args: &[String]) -> Result<(), ShellError> {
        let mut rest = args.iter();
        while let Some(arg) = rest.next() {
            let flag = self
                .flags
                .values_mut()
                .find(|flag| arg == &flag.short || arg == &flag.long)
                .ok_or_else(|| ShellError::FlagError(format!("Unknown flag {}", arg)))?;

            flag.value = if flag.takes_value {
                let value = rest.next().ok_or_else(|| {
                    ShellError::FlagError(format!("Flag {} requires a value", arg))
                })?;
                Some(value.clone())
            } else {
                Some("true".to_string())
            };
        }
        Ok(())
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.flags
            .get(name)
            .and_then(|f| f.value.as_ref())
            .is_some()
    }

    pub fn get_value(&self, name: &str) -> Option<&String> {
        self.flags.get(name).and_then(|f| f.value.as_ref())
    }

    pub fn print_help(&self) {
        println!("Usage: lash [OPTIONS]");
        println!("\nOptions:");
        let mut flags: Vec<&Flag> = self.flags.values().collect();
        flags.sort_by(|a, b| a.long.cmp(&b.long));
        for flag in flags {
            println!("  {}, {:<15} {}", flag.short, flag.long, flag.description);
        }
    }
}
