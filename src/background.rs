/// Strips a trailing `&` token. Returns true when the command should run
/// without the shell waiting for it.
pub fn take_background(tokens: &mut Vec<String>) -> bool {
    if tokens.last().is_some_and(|t| t == "&") {
        tokens.pop();
        return true;
    }
    false
}
