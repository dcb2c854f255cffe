use std::io::{BufRead, Write};

use log::warn;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use crate::completion::ShellCompleter;
use crate::error::Result;

/// Where the shell gets its lines. `Ok(None)` means input is exhausted.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Line editor with history and tab completion, for terminals.
pub struct EditorSource {
    editor: Editor<ShellCompleter, DefaultHistory>,
}

impl EditorSource {
    pub fn new() -> Result<Self> {
        let mut editor = Editor::new()?;
        editor.set_helper(Some(ShellCompleter::new()));
        Ok(Self { editor })
    }
}

impl LineSource for EditorSource {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                            warn!("could not record history: {}", e);
                        }
                    }
                    return Ok(Some(line));
                }
                // Ctrl-C drops the line being edited.
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Plain line reader for piped input. The prompt still goes to `prompt_out`.
pub struct StreamSource<R, W> {
    reader: R,
    prompt_out: W,
    buf: Vec<u8>,
}

impl<R: BufRead, W: Write> StreamSource<R, W> {
    pub fn new(reader: R, prompt_out: W) -> Self {
        Self {
            reader,
            prompt_out,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead, W: Write> LineSource for StreamSource<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompt_out.write_all(prompt.as_bytes())?;
        self.prompt_out.flush()?;

        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        let mut line = String::from_utf8_lossy(&self.buf).into_owned();
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}

/// Cuts `line` to at most `max` characters. Returns whether anything was cut.
pub fn bound_line(line: &mut String, max: usize) -> bool {
    match line.char_indices().nth(max) {
        Some((end, _)) => {
            line.truncate(end);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_stream_lines_and_eof() {
        let mut prompts = Vec::new();
        {
            let mut source = StreamSource::new(Cursor::new("ls -l\r\nsort\nlast"), &mut prompts);
            assert_eq!(source.read_line(">").unwrap().as_deref(), Some("ls -l"));
            assert_eq!(source.read_line(">").unwrap().as_deref(), Some("sort"));
            assert_eq!(source.read_line(">").unwrap().as_deref(), Some("last"));
            assert_eq!(source.read_line(">").unwrap(), None);
        }
        assert_eq!(prompts, b">>>>");
    }

    #[test]
    fn test_stream_empty_line() {
        let mut source = StreamSource::new(Cursor::new("\n"), Vec::new());
        assert_eq!(source.read_line("").unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_stream_invalid_utf8_is_lossy() {
        let mut source = StreamSource::new(Cursor::new(b"echo \xff\n".to_vec()), Vec::new());
        assert_eq!(source.read_line("").unwrap().as_deref(), Some("echo \u{fffd}"));
    }

    #[test]
    fn test_bound_line() {
        let mut short = "echo hi".to_string();
        assert!(!bound_line(&mut short, 255));
        assert_eq!(short, "echo hi");

        let mut long = "é".repeat(300);
        assert!(bound_line(&mut long, 255));
        assert_eq!(long.chars().count(), 255);

        let mut exact = "x".repeat(255);
        assert!(!bound_line(&mut exact, 255));
    }
}
