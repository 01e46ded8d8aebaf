//! CLI output formatting utilities.

use colored::Colorize;

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Confirm an action with the user.
pub fn confirm(message: &str) -> bool {
    use std::io::{self, Write};

    print!("{message} [y/N] ");
    io::stdout().flush().unwrap();

    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
