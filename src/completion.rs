use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::env;

use crate::commands::BUILTINS;

/// Tab completion: directives and PATH programs for the first word,
/// filenames after that.
pub struct ShellCompleter {
    filenames: FilenameCompleter,
}

impl ShellCompleter {
    pub fn new() -> Self {
        Self {
            filenames: FilenameCompleter::new(),
        }
    }
}

impl Default for ShellCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl Completer for ShellCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> Result<(usize, Vec<Self::Candidate>), ReadlineError> {
        let (start, word) = extract_word(line, pos);
        if is_first_word(line, start) && !word.contains('/') {
            Ok((start, program_candidates(word)))
        } else {
            self.filenames.complete(line, pos, ctx)
        }
    }
}

/// Finds the word under the cursor and where it starts.
fn extract_word(line: &str, pos: usize) -> (usize, &str) {
    let start = line[..pos]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8());
    (start, &line[start..pos])
}

/// Only blanks precede the word starting at `start`.
fn is_first_word(line: &str, start: usize) -> bool {
    line[..start].trim().is_empty()
}

fn program_candidates(prefix: &str) -> Vec<Pair> {
    let mut names: Vec<String> = BUILTINS
        .iter()
        .filter(|b| b.starts_with(prefix))
        .map(|b| b.to_string())
        .collect();

    if let Some(paths) = env::var_os("PATH") {
        for dir in env::split_paths(&paths) {
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            names.extend(
                entries
                    .flatten()
                    .filter_map(|e| e.file_name().into_string().ok())
                    .filter(|name| name.starts_with(prefix)),
            );
        }
    }

    names.sort();
    names.dedup();
    names
        .into_iter()
        .map(|name| Pair {
            replacement: format!("{} ", name),
            display: name,
        })
        .collect()
}

impl Helper for ShellCompleter {}
impl Hinter for ShellCompleter {
    type Hint = String;
}
impl Highlighter for ShellCompleter {}
impl Validator for ShellCompleter {}
