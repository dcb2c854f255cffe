use std::fmt;
use std::fs::{File, OpenOptions};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;

use log::debug;
use nix::libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::unistd::dup2;

use crate::error::{Result, ShellError};
use crate::trace::Tracer;

/// Which standard stream a redirection replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub fn verb(self) -> &'static str {
        match self {
            Direction::Input => "reading",
            Direction::Output => "writing",
        }
    }

    fn target_fd(self) -> RawFd {
        match self {
            Direction::Input => STDIN_FILENO,
            Direction::Output => STDOUT_FILENO,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => f.write_str("input"),
            Direction::Output => f.write_str("output"),
        }
    }
}

/// A redirection operator extracted from the token list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub direction: Direction,
    pub path: PathBuf,
}

/// A command with its redirection operators and operands removed.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    pub args: Vec<String>,
    /// Output first, then input, in the order they are applied.
    pub redirections: Vec<Redirection>,
}

/// Extracts `>` and `<` operators from the tokens.
///
/// The first `>` followed by a path cuts the list at the operator; anything
/// after the path is dropped, so a later `>` never takes effect. A `<` counts
/// only when it is not the program name and has a path after it; the pair is
/// filtered out of the list. An operator with no path after it stays as an
/// ordinary argument.
pub fn parse_redirections(tokens: Vec<String>) -> Result<ParsedCommand> {
    let mut args = tokens;
    let mut redirections = Vec::new();

    if let Some(i) = (0..args.len()).find(|&i| args[i] == ">" && i + 1 < args.len()) {
        let path = PathBuf::from(&args[i + 1]);
        args.truncate(i);
        redirections.push(Redirection {
            direction: Direction::Output,
            path,
        });
    }

    let inputs: Vec<usize> = (1..args.len())
        .filter(|&i| args[i] == "<" && i + 1 < args.len())
        .collect();
    match inputs.as_slice() {
        [] => {}
        [i] => {
            let i = *i;
            redirections.push(Redirection {
                direction: Direction::Input,
                path: PathBuf::from(&args[i + 1]),
            });
            args = args
                .into_iter()
                .enumerate()
                .filter(|(idx, _)| *idx != i && *idx != i + 1)
                .map(|(_, arg)| arg)
                .collect();
        }
        _ => return Err(ShellError::AmbiguousInput),
    }

    Ok(ParsedCommand { args, redirections })
}

impl ParsedCommand {
    /// Opens each redirection target and rebinds the matching standard
    /// stream of the current process. Only meant to run in a forked child.
    ///
    /// Trace lines are written and every file is opened before any stream
    /// is rebound, so the trace never lands in a redirected output file.
    pub fn apply(&self, tracer: &Tracer) -> Result<()> {
        self.trace(tracer);
        let opened = self
            .redirections
            .iter()
            .map(|redirection| open_target(redirection).map(|file| (redirection, file)))
            .collect::<Result<Vec<_>>>()?;
        for (redirection, file) in opened {
            let fd = redirection.direction.target_fd();
            dup2(file.as_raw_fd(), fd).map_err(|e| ShellError::Dup(redirection.direction, e))?;
            debug!("standard {} now bound to {}", redirection.direction, redirection.path.display());
        }
        Ok(())
    }

    fn trace(&self, tracer: &Tracer) {
        for redirection in &self.redirections {
            let path = redirection.path.display();
            match redirection.direction {
                Direction::Output => tracer.note(format_args!("Redirecting I/O to: {}", path)),
                Direction::Input => tracer.note(format_args!("Redirecting I/O from: {}", path)),
            }
        }
    }
}

fn open_target(redirection: &Redirection) -> Result<File> {
    let opened = match redirection.direction {
        Direction::Output => OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o644)
            .open(&redirection.path),
        Direction::Input => File::open(&redirection.path),
    };
    opened.map_err(|source| ShellError::Redirect {
        path: redirection.path.clone(),
        direction: redirection.direction,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Captured;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_stdout_redirect() {
        let parsed = parse_redirections(words("ls -l > out.txt")).unwrap();
        assert_eq!(parsed.args, vec!["ls", "-l"]);
        assert_eq!(
            parsed.redirections,
            vec![Redirection {
                direction: Direction::Output,
                path: PathBuf::from("out.txt"),
            }]
        );
    }

    #[test]
    fn test_parse_stdin_redirect() {
        let parsed = parse_redirections(words("sort < in.txt")).unwrap();
        assert_eq!(parsed.args, vec!["sort"]);
        assert_eq!(parsed.redirections[0].direction, Direction::Input);
        assert_eq!(parsed.redirections[0].path, PathBuf::from("in.txt"));
    }

    #[test]
    fn test_input_keeps_trailing_arguments() {
        let parsed = parse_redirections(words("grep < in.txt -n foo")).unwrap();
        assert_eq!(parsed.args, vec!["grep", "-n", "foo"]);
    }

    #[test]
    fn test_both_directions() {
        let parsed = parse_redirections(words("sort < in.txt > out.txt")).unwrap();
        assert_eq!(parsed.args, vec!["sort"]);
        let directions: Vec<_> = parsed.redirections.iter().map(|r| r.direction).collect();
        assert_eq!(directions, vec![Direction::Output, Direction::Input]);
    }

    #[test]
    fn test_output_truncates_everything_after() {
        let parsed = parse_redirections(words("echo hi > a.txt extra > b.txt")).unwrap();
        assert_eq!(parsed.args, vec!["echo", "hi"]);
        assert_eq!(parsed.redirections.len(), 1);
        assert_eq!(parsed.redirections[0].path, PathBuf::from("a.txt"));
    }

    #[test]
    fn test_operator_without_operand_is_an_argument() {
        let parsed = parse_redirections(words("echo >")).unwrap();
        assert_eq!(parsed.args, vec!["echo", ">"]);
        assert!(parsed.redirections.is_empty());

        let parsed = parse_redirections(words("echo <")).unwrap();
        assert_eq!(parsed.args, vec!["echo", "<"]);
    }

    #[test]
    fn test_leading_input_operator_is_not_a_redirection() {
        let parsed = parse_redirections(words("< in.txt")).unwrap();
        assert_eq!(parsed.args, vec!["<", "in.txt"]);
        assert!(parsed.redirections.is_empty());
    }

    #[test]
    fn test_operators_must_match_exactly() {
        let parsed = parse_redirections(words("echo >> log 2> err")).unwrap();
        assert_eq!(parsed.args, vec!["echo", ">>", "log", "2>", "err"]);
    }

    #[test]
    fn test_trace_names_every_target() {
        let captured = Captured::default();
        let parsed = parse_redirections(words("sort < in.txt > out.txt")).unwrap();
        parsed.trace(&captured.tracer(true));
        assert_eq!(
            captured.text(),
            "Redirecting I/O to: out.txt\nRedirecting I/O from: in.txt\n"
        );

        let quiet = Captured::default();
        parsed.trace(&quiet.tracer(false));
        assert_eq!(quiet.text(), "");
    }

    #[test]
    fn test_multiple_inputs_rejected() {
        let err = parse_redirections(words("cat < a < b")).unwrap_err();
        assert!(matches!(err, ShellError::AmbiguousInput));
    }

    #[test]
    fn test_open_missing_input_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        let err = open_target(&Redirection {
            direction: Direction::Input,
            path: path.clone(),
        })
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("missing.txt"));
        assert!(msg.contains("for reading"));
    }

    #[test]
    fn test_open_output_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "stale contents").unwrap();
        open_target(&Redirection {
            direction: Direction::Output,
            path: path.clone(),
        })
        .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
