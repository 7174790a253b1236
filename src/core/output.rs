//! Terminal output for gitcms commands.
//!
//! Every command reports through these helpers so results, problems and
//! settings listings look the same everywhere. Each `print_*` function has a
//! `format_*` counterpart that builds the exact text, which keeps the layout
//! testable without capturing stdout.
//!
//! # Styling
//! - `✕ Error:` in red for failures, `!` in yellow for conditions worth a retry
//! - `✓` in green once a change was written
//! - Settings keys in blue, secondary detail in bright_black
//!
//! Colors follow `colored`'s rules, so `NO_COLOR` produces plain text.

use colored::*;

pub fn format_error(message: &str) -> String {
    format!("\n{} {}\n", "✕ Error:".red(), message.white())
}

/// A failure followed by the accepted invocations and their options
///
/// ```text
///
/// ✕ Error: <message>.
///
/// Usage:
///   <pattern>
///
/// Options:
///   <flag>  <description>
///
/// ```
pub fn format_error_with_structured_usage(
    message: &str,
    usage_patterns: &[&str],
    options: &[(&str, &str)],
) -> String {
    let mut out = format!("\n{} {}.\n\n{}\n", "✕ Error:".red(), message.white(), "Usage:".blue());
    for pattern in usage_patterns {
        out.push_str(&format!("  {}\n", pattern.white()));
    }
    if !options.is_empty() {
        out.push_str(&format!("\n{}\n", "Options:".blue()));
        for (flag, description) in options {
            out.push_str(&format!("  {}  {}\n", flag.bright_black(), description.bright_black()));
        }
    }
    out
}

pub fn format_success(message: &str) -> String {
    format!("\n{} {}", "✓".green(), message.white())
}

pub fn format_warning(message: &str) -> String {
    format!("\n{} {}\n", "!".yellow(), message.white())
}

/// `key  value` with the key padded to `width`
pub fn format_key_value(key: &str, value: &str, width: usize) -> String {
    format!("  {}  {}", pad(key, width).blue(), value.white())
}

pub fn format_section_header(header: &str) -> String {
    format!("\n{}:\n", header.white())
}

// Pad before coloring so escape codes don't count towards the width
fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

pub fn print_error(message: &str) {
    println!("{}", format_error(message));
}

/// Used for unknown keys and malformed arguments
pub fn print_error_with_structured_usage(
    message: &str,
    usage_patterns: &[&str],
    options: &[(&str, &str)],
) {
    println!("{}", format_error_with_structured_usage(message, usage_patterns, options));
}

/// Reported after a write reached the repository or the cache
pub fn print_success(message: &str) {
    println!("{}", format_success(message));
}

pub fn print_info(message: &str) {
    println!("\n{}\n", message.white());
}

/// A recoverable problem: busy lock, stale token, unreachable remote
pub fn print_warning(message: &str) {
    println!("{}", format_warning(message));
}

pub fn print_key_value(key: &str, value: &str, width: usize) {
    println!("{}", format_key_value(key, value, width));
}

pub fn print_section_header(header: &str) {
    println!("{}", format_section_header(header));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_error_line() {
        plain();
        assert_eq!(
            format_error("Not in a git repository"),
            "\n✕ Error: Not in a git repository\n"
        );
    }

    #[test]
    fn test_unknown_field_usage() {
        plain();
        let out = format_error_with_structured_usage(
            "Unknown settings field 'colour'",
            &["gitcms settings set <key> <value> [--local]"],
            &[("postsPath", "Directory holding posts")],
        );
        assert!(out.starts_with("\n✕ Error: Unknown settings field 'colour'.\n\nUsage:\n"));
        assert!(out.contains("  gitcms settings set <key> <value> [--local]\n"));
        assert!(out.contains("\nOptions:\n  postsPath  Directory holding posts\n"));
    }

    #[test]
    fn test_usage_without_options() {
        plain();
        let out = format_error_with_structured_usage("Bad", &["gitcms open"], &[]);
        assert!(!out.contains("Options:"));
    }

    #[test]
    fn test_key_value_alignment() {
        plain();
        assert_eq!(
            format_key_value("postsPath", "content/posts", 12),
            "  postsPath     content/posts"
        );
        // a key longer than the width is never truncated
        assert_eq!(format_key_value("imageFileTypes", "png", 4), "  imageFileTypes  png");
    }

    #[test]
    fn test_success_warning_and_header() {
        plain();
        assert_eq!(format_success("Set postsPath locally"), "\n✓ Set postsPath locally");
        assert_eq!(
            format_warning("Another sync is in progress"),
            "\n! Another sync is in progress\n"
        );
        assert_eq!(format_section_header("Collections"), "\nCollections:\n");
    }
}
