//! Interactive confirmation and selection.
//!
//! Risky operations (tracking past the soft limit, schedule gaps under ten
//! minutes) ask for approval through the [`Confirm`] seam, so the callers
//! stay testable without a terminal.

use std::io::Write;

/// Yes/no decision capability.
pub trait Confirm: Send + Sync {
    /// Ask the user to approve `prompt`. Returns `true` to proceed.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Terminal implementation reading one line from stdin.
///
/// Anything other than an explicit `y`/`yes` declines, including EOF.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Confirm for TerminalPrompt {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Present a numbered list and read one 1-based selection from stdin.
///
/// Returns the selected zero-based index, or `None` for empty input, a
/// non-numeric answer, or a number out of range.
pub fn select_from(title: &str, options: &[String]) -> Option<usize> {
    if options.is_empty() {
        return None;
    }

    println!("{title}");
    for (i, option) in options.iter().enumerate() {
        println!("  {}. {option}", i + 1);
    }
    print!("> ");
    let _ = std::io::stdout().flush();

    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_err() {
        return None;
    }
    parse_selection(&line, options.len())
}

fn parse_selection(input: &str, len: usize) -> Option<usize> {
    let n: usize = input.trim().parse().ok()?;
    if (1..=len).contains(&n) { Some(n - 1) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_selection_accepts_in_range_numbers() {
        assert_eq!(parse_selection("1", 3), Some(0));
        assert_eq!(parse_selection("3", 3), Some(2));
        assert_eq!(parse_selection("  2 \n", 3), Some(1));
    }

    #[test]
    fn parse_selection_rejects_zero_and_out_of_range() {
        assert_eq!(parse_selection("0", 3), None);
        assert_eq!(parse_selection("4", 3), None);
    }

    #[test]
    fn parse_selection_rejects_non_numbers() {
        assert_eq!(parse_selection("", 3), None);
        assert_eq!(parse_selection("abc", 3), None);
        assert_eq!(parse_selection("-1", 3), None);
    }
}
