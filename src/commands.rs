use std::env;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// The only directive the shell handles itself.
pub const QUIT: &str = "quit";

/// Directives offered by completion.
pub const BUILTINS: &[&str] = &[QUIT];

/// Whether a raw line asks the shell to end. Checked before tokenizing, so
/// it is a plain prefix test on the line as read.
pub fn is_quit(line: &str) -> bool {
    line.starts_with(QUIT)
}

/// Finds the full path of a program by searching PATH, the same lookup
/// `execvp` performs for bare names.
pub fn full_path(program: &str) -> Option<PathBuf> {
    if program.contains('/') {
        let path = PathBuf::from(program);
        return is_executable(&path).then_some(path);
    }
    env::var_os("PATH").and_then(|paths| {
        env::split_paths(&paths)
            .map(|dir| dir.join(program))
            .find(|full| is_executable(full))
    })
}

fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_prefix() {
        assert!(is_quit("quit"));
        assert!(is_quit("quit now"));
        assert!(is_quit("quitter"));
        assert!(!is_quit(" quit"));
        assert!(!is_quit("exit"));
        assert!(!is_quit(""));
    }

    #[test]
    fn test_full_path_finds_sh() {
        let found = full_path("sh").expect("sh on PATH");
        assert!(found.is_absolute());
        assert!(found.ends_with("sh"));
    }

    #[test]
    fn test_full_path_missing() {
        assert_eq!(full_path("definitely-not-a-real-program-xyz"), None);
    }

    #[test]
    fn test_full_path_explicit() {
        assert_eq!(full_path("/bin/sh"), Some(PathBuf::from("/bin/sh")));
        assert_eq!(full_path("/nonexistent/sh"), None);
    }
}
