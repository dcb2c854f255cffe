use argh::FromArgs;

/// Maximum number of argument tokens kept per command.
pub const MAX_ARGS: usize = 64;

/// Maximum number of characters kept per input line.
pub const MAX_LINE: usize = 255;

pub const DEFAULT_PROMPT: &str = ">";

#[derive(FromArgs, Debug)]
/// A minimal interactive command shell.
pub struct Args {
    #[argh(switch, short = 'v')]
    /// trace tokens, redirections and child exit statuses on standard output.
    pub verbose: bool,

    #[argh(option, short = 'p', default = "DEFAULT_PROMPT.to_string()")]
    /// prompt printed before each line is read.
    pub prompt: String,

    #[argh(switch)]
    /// read plain lines from standard input even when it is a terminal.
    pub plain: bool,
}

/// Settings threaded through the shell and its launcher.
#[derive(Debug, Clone)]
pub struct Config {
    pub verbose: bool,
    pub prompt: String,
    pub max_args: usize,
    pub max_line: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            prompt: DEFAULT_PROMPT.to_string(),
            max_args: MAX_ARGS,
            max_line: MAX_LINE,
        }
    }
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            verbose: args.verbose,
            prompt: args.prompt.clone(),
            ..Self::default()
        }
    }
}
