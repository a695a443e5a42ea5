//! ANSI color helpers for terminal output

/// ANSI escape codes
pub mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";

    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

use ansi::*;

use crate::chat::Sender;

/// Label in front of a transcript line
pub fn speaker(sender: Sender) -> String {
    match sender {
        Sender::User => format!("{}{}you{}", BOLD, CYAN, RESET),
        Sender::Bot => format!("{}{}bot{}", BOLD, MAGENTA, RESET),
    }
}

/// Format a success message (green)
pub fn success(msg: &str) -> String {
    format!("{}{}{}", GREEN, msg, RESET)
}

/// Format an error message (red)
pub fn error(msg: &str) -> String {
    format!("{}{}{}", RED, msg, RESET)
}

/// Format a warning message (yellow)
pub fn warning(msg: &str) -> String {
    format!("{}{}{}", YELLOW, msg, RESET)
}

/// Format a status/info message (gray)
pub fn status(msg: &str) -> String {
    format!("{}{}{}", GRAY, msg, RESET)
}

pub fn prompt() -> String {
    format!("{}{}>>> {}", BOLD, MAGENTA, RESET)
}

pub fn separator(width: usize) -> String {
    format!("{}{}{}", DIM, "─".repeat(width), RESET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_in_reset() {
        for s in [success("ok"), error("bad"), warning("hmm"), status("..")] {
            assert!(s.ends_with(RESET));
        }
        assert!(speaker(Sender::User).contains("you"));
        assert!(speaker(Sender::Bot).contains("bot"));
    }

    #[test]
    fn test_separator_width() {
        let s = separator(10);
        assert_eq!(s.matches('─').count(), 10);
    }
}
