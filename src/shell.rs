use log::{debug, warn};

use crate::commands::is_quit;
use crate::config::Config;
use crate::error::Result;
use crate::input::{LineSource, bound_line};
use crate::launcher::{Outcome, launch};
use crate::tokenize::tokenize;
use crate::trace::Tracer;

/// Whether the loop keeps prompting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The prompt loop: read, tokenize, launch, repeat.
pub struct Shell<S> {
    config: Config,
    tracer: Tracer,
    source: S,
    last_outcome: Option<Outcome>,
}

impl<S: LineSource> Shell<S> {
    pub fn new(config: Config, source: S) -> Self {
        Self {
            tracer: Tracer::new(config.verbose),
            config,
            source,
            last_outcome: None,
        }
    }

    /// Replaces the tracer built from `config.verbose`.
    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }

    /// Runs until `quit` or end of input. Errors only on failures the shell
    /// itself cannot survive (fork, wait, reading input).
    pub fn run(&mut self) -> Result<()> {
        loop {
            let Some(line) = self.source.read_line(&self.config.prompt)? else {
                debug!("end of input");
                return Ok(());
            };
            if self.handle_line(line)? == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Processes one raw line.
    pub fn handle_line(&mut self, mut line: String) -> Result<Flow> {
        if bound_line(&mut line, self.config.max_line) {
            warn!("input line cut to {} characters", self.config.max_line);
            eprintln!("warning: line longer than {} characters was cut", self.config.max_line);
        }
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        if is_quit(&line) {
            self.tracer.note(format_args!("Quit called, gracefully exiting..."));
            return Ok(Flow::Quit);
        }

        self.tracer.debug(format_args!("Splitting string \"{}\" into tokens:", line));
        let tokenized = tokenize(&line, self.config.max_args);
        if tokenized.dropped > 0 {
            warn!("dropped {} tokens past the limit", tokenized.dropped);
            eprintln!(
                "warning: only {} arguments are kept, {} dropped",
                self.config.max_args, tokenized.dropped
            );
        }
        if tokenized.tokens.is_empty() {
            return Ok(Flow::Continue);
        }
        self.tracer.tokens(&tokenized.tokens);

        if let Some(outcome) = launch(tokenized.tokens, &self.tracer)? {
            debug!("command finished: {:?} (success: {})", outcome, outcome.success());
            self.last_outcome = Some(outcome);
        }
        Ok(Flow::Continue)
    }

    /// Outcome of the most recent launched command.
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }
}
