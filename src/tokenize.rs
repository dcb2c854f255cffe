/// Result of splitting one input line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Tokenized {
    pub tokens: Vec<String>,
    /// Tokens past the limit that were not kept.
    pub dropped: usize,
}

/// Splits a line into owned, non-empty tokens on runs of whitespace.
/// At most `max_args` tokens are kept; the tail beyond that is counted in
/// `dropped`, never the head.
pub fn tokenize(input: &str, max_args: usize) -> Tokenized {
    let mut out = Tokenized::default();
    let mut current = String::new();

    let push = |word: &mut String, out: &mut Tokenized| {
        if word.is_empty() {
            return;
        }
        if out.tokens.len() < max_args {
            out.tokens.push(std::mem::take(word));
        } else {
            out.dropped += 1;
            word.clear();
        }
    };

    for c in input.chars() {
        if c.is_whitespace() {
            push(&mut current, &mut out);
        } else {
            current.push(c);
        }
    }
    push(&mut current, &mut out);

    out
}
