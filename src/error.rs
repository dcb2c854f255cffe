use std::io;
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use thiserror::Error;

use crate::redirection::Direction;

/// Errors raised while reading, parsing or launching a command.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("fork failed: {0}")]
    Fork(#[source] nix::Error),

    #[error("waiting for child failed: {0}")]
    Wait(#[source] nix::Error),

    #[error("Error in I/O redirection, could not open file {} for {}: {source}", .path.display(), .direction.verb())]
    Redirect {
        path: PathBuf,
        direction: Direction,
        #[source]
        source: io::Error,
    },

    #[error("could not rebind standard {0}: {1}")]
    Dup(Direction, #[source] nix::Error),

    #[error("more than one input redirection in a single command")]
    AmbiguousInput,

    #[error("argument contains a NUL byte: {0:?}")]
    NulInArgument(String),

    #[error("reading input failed: {0}")]
    Readline(#[from] ReadlineError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ShellError>;
