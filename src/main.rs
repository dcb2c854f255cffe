mod background;
mod commands;
mod completion;
mod config;
mod error;
mod input;
mod launcher;
mod redirection;
mod shell;
mod tokenize;
mod trace;

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Context;
use log::debug;

use crate::config::{Args, Config};
use crate::input::{EditorSource, StreamSource};
use crate::shell::Shell;

fn main() -> ExitCode {
    env_logger::init();
    let args: Args = argh::from_env();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = Config::from(args);
    debug!("starting with {:?}", config);

    if io::stdin().is_terminal() && !args.plain {
        let source = EditorSource::new().context("could not start line editor")?;
        Shell::new(config, source).run().context("shell stopped")?;
    } else {
        let source = StreamSource::new(io::stdin().lock(), io::stdout());
        Shell::new(config, source).run().context("shell stopped")?;
    }
    Ok(())
}
