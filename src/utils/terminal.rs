//! Terminal utilities for titles and report formatting

use std::io::Write;

/// Sets the terminal title to the specified text
pub fn set_terminal_title(title: &str) {
    // ANSI escape sequence to set terminal title
    print!("\x1b]0;{}\x07", title);
}

/// Sets the terminal title and ensures it's flushed to the terminal
pub fn set_terminal_title_and_flush(title: &str) {
    set_terminal_title(title);
    let _ = std::io::stdout().flush();
}

/// A horizontal rule of `width` dashes
pub fn rule(width: usize) -> String {
    "-".repeat(width)
}

/// Prints `message` between two rules
pub fn print_banner(message: &str, width: usize) {
    println!("{}", rule(width));
    println!("{message}");
    println!("{}", rule(width));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_width() {
        assert_eq!(rule(0), "");
        assert_eq!(rule(5), "-----");
    }
}
