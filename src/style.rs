//! ANSI coloring for diagnostic output.
//!
//! One function, `paint`, wraps a fragment in a color's escape sequence and
//! a reset. The palette is fixed to what the error renderer needs.

const RESET: &str = "\x1b[0m";

/// The colors the diagnostic renderer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Green,
    Blue,
    Cyan,
    /// Bold red, for the leading `error` label.
    ErrorLabel,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Blue => "\x1b[34m",
            Color::Cyan => "\x1b[36m",
            Color::ErrorLabel => "\x1b[1;31m",
        }
    }
}

/// Wrap `text` in `color`'s escape code, resetting afterwards.
pub fn paint(color: Color, text: &str) -> String {
    format!("{}{}{}", color.code(), text, RESET)
}
