use std::ffi::CString;
use std::fmt;
use std::io::{self, Write};
use std::process;

use log::debug;
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, execvp, fork};

use crate::background::take_background;
use crate::commands::full_path;
use crate::error::{Result, ShellError};
use crate::redirection::parse_redirections;
use crate::trace::Tracer;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_NOT_EXECUTABLE: i32 = 126;
const EXIT_NOT_FOUND: i32 = 127;

/// What the shell learned about a launched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Foreground child exited with this status.
    Exited(i32),
    /// Foreground child was killed by a signal.
    Signaled(Signal),
    /// Background child; its status is never collected.
    Detached(Pid),
}

impl Outcome {
    pub fn success(&self) -> bool {
        matches!(self, Outcome::Exited(0) | Outcome::Detached(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Exited(code) => write!(f, "{}", code),
            Outcome::Signaled(signal) => write!(f, "killed by {}", signal),
            Outcome::Detached(pid) => write!(f, "detached as pid {}", pid),
        }
    }
}

/// Runs one tokenized command in a child process.
///
/// A trailing `&` is stripped before forking so both sides agree on the
/// arguments. The child applies redirections and execs; the parent waits for
/// that specific child unless the command was backgrounded. Returns `None`
/// when nothing is left to run. Failures inside the child only show up in
/// its exit status.
pub fn launch(mut tokens: Vec<String>, tracer: &Tracer) -> Result<Option<Outcome>> {
    let background = take_background(&mut tokens);
    if tokens.is_empty() {
        return Ok(None);
    }

    // The child inherits a copy of anything still buffered.
    io::stdout().flush()?;

    // SAFETY: the shell runs a single thread, so no lock can be held by
    // another thread at the moment of forking.
    let forked = unsafe { fork() }.map_err(ShellError::Fork)?;
    match forked {
        ForkResult::Child => {
            let code = run_child(tokens, tracer);
            process::exit(code);
        }
        ForkResult::Parent { child } => {
            debug!("forked child {} (background: {})", child, background);
            if background {
                tracer.debug(format_args!("child {} running in background", child));
                return Ok(Some(Outcome::Detached(child)));
            }
            let outcome = wait_for(child)?;
            tracer.debug(format_args!("child retvar was: {}", outcome));
            Ok(Some(outcome))
        }
    }
}

/// Child side: returns the exit status to use when exec does not happen.
fn run_child(tokens: Vec<String>, tracer: &Tracer) -> i32 {
    tracer.debug(format_args!("Child created."));
    tracer.debug(format_args!("Entering I/O redirection phase"));

    let parsed = match parse_redirections(tokens) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", e);
            return EXIT_FAILURE;
        }
    };
    if let Err(e) = parsed.apply(tracer) {
        eprintln!("{}", e);
        return EXIT_FAILURE;
    }

    // A bare `> file` only creates the file.
    let Some(program) = parsed.args.first() else {
        return EXIT_SUCCESS;
    };

    let argv = match to_cstrings(&parsed.args) {
        Ok(argv) => argv,
        Err(e) => {
            eprintln!("{}", e);
            return EXIT_FAILURE;
        }
    };

    if tracer.enabled() {
        match full_path(program) {
            Some(path) => tracer.debug(format_args!("executing {}", path.display())),
            None => tracer.debug(format_args!("{} not found on PATH", program)),
        }
    }

    let err = match execvp(&argv[0], &argv) {
        Ok(never) => match never {},
        Err(err) => err,
    };
    match err {
        Errno::ENOENT => {
            eprintln!("{}: command not found", program);
            EXIT_NOT_FOUND
        }
        err => {
            eprintln!("{}: {}", program, err.desc());
            EXIT_NOT_EXECUTABLE
        }
    }
}

fn to_cstrings(args: &[String]) -> Result<Vec<CString>> {
    args.iter()
        .map(|arg| CString::new(arg.as_str()).map_err(|_| ShellError::NulInArgument(arg.clone())))
        .collect()
}

/// Blocks until `child` exits or is killed.
fn wait_for(child: Pid) -> Result<Outcome> {
    loop {
        match waitpid(child, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(Outcome::Exited(code)),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(Outcome::Signaled(signal)),
            Ok(status) => debug!("child {} reported {:?}, still waiting", child, status),
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(ShellError::Wait(e)),
        }
    }
}
