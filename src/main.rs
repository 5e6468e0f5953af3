use lash::config::Config;
use lash::error::ShellError;
use lash::flags::Flags;
use lash::logging;
use lash::shell::Shell;
use std::env;
use std::process;

fn run() -> Result<(), ShellError> {
    let mut flags = Flags::new();
    let args: Vec<String> = env::args().skip(1).collect();
    flags.parse(&args)?;

    if flags.is_set("help") {
        flags.print_help();
        return Ok(());
    }

    if flags.is_set("version") {
        println!("lash {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    logging::init(&flags);

    let config = Config::load(&flags)?;
    let mut shell = Shell::new(&config)?;
    shell.run()
}

fn main() {
    if let Err(e) = run() {
        eprintln!("lash: {}", e);
        process::exit(1);
    }
}
