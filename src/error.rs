//! Diagnostics for the three pipeline phases.
//!
//! Each phase has its own error type carrying a kind and a source position.
//! `Display` produces the stable one-line message format; callers that still
//! hold the source text can use `display_with_source` for a rendering with
//! the offending line and a caret underline.

use std::fmt;

use crate::style::{paint, Color};
use crate::token::Span;

// ----------------------------------------------------------------------------
// Lexer errors
// ----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: u32,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum LexErrorKind {
    /// EOF inside a string literal; the line is where the string opened.
    UnterminatedString,
    /// Integer literal that does not fit in an i64.
    IntegerOverflow { lexeme: String },
}

impl LexError {
    pub fn new(kind: LexErrorKind, line: u32, span: Span) -> Self {
        LexError { kind, line, span }
    }

    fn detail(&self) -> String {
        match &self.kind {
            LexErrorKind::UnterminatedString => "unterminated string literal".to_string(),
            LexErrorKind::IntegerOverflow { lexeme } => {
                format!("integer literal '{}' is out of range", lexeme)
            }
        }
    }

    pub fn display_with_source(&self, source: &str) -> String {
        render_span_context(&self.to_string(), source, self.span, None)
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Lexer Error] line {}: {}", self.line, self.detail())
    }
}

impl std::error::Error for LexError {}

// ----------------------------------------------------------------------------
// Parser errors
// ----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: u32,
    pub span: Span,
    /// Lexeme of the token the parser was looking at.
    pub token: String,
}

#[derive(Debug, Clone)]
pub enum ParseErrorKind {
    /// A specific token was required, e.g. `Expected { what: "')'" }`.
    Expected { what: &'static str },
    ExpectedIdentifier,
    /// No parse rule matches the current token.
    UnknownToken,
    /// Numeric lexeme that fails to convert.
    InvalidNumber,
    UnexpectedEof,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: u32, span: Span, token: String) -> Self {
        ParseError {
            kind,
            line,
            span,
            token,
        }
    }

    fn detail(&self) -> String {
        match &self.kind {
            ParseErrorKind::Expected { what } => format!("Expected an {}.", what),
            ParseErrorKind::ExpectedIdentifier => "Expected an identifier.".to_string(),
            ParseErrorKind::UnknownToken => "Unknown token.".to_string(),
            ParseErrorKind::InvalidNumber => format!("Invalid number '{}'.", self.token),
            ParseErrorKind::UnexpectedEof => "Unexpected end of input.".to_string(),
        }
    }

    pub fn display_with_source(&self, source: &str) -> String {
        render_span_context(&self.to_string(), source, self.span, None)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [PARSER_ERROR] in line: {}, in token: {}",
            self.detail(),
            self.line,
            self.token
        )
    }
}

impl std::error::Error for ParseError {}

// ----------------------------------------------------------------------------
// Evaluator errors
// ----------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub enum EvalErrorKind {
    /// Unresolved name in read position; `suggestion` is a near-miss from the
    /// scope chain, when one exists.
    Reference {
        name: String,
        suggestion: Option<String>,
    },
    NotAFunction { name: String },
    MissingFunctionBody { name: String },
    /// Operator applied to operand types it has no rule for.
    InvalidOperand { op: String },
    /// Operator token with no evaluation rule at all.
    InvalidOperator { op: String },
    DivisionByZero { op: String },
    /// Left side of `=` is not a variable.
    AssignTarget,
    /// Prototype parameter that is neither a variable nor a defaulted one.
    InvalidParameter,
    IllegalBreak,
    IllegalContinue,
    IllegalReturn,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, line: u32) -> Self {
        EvalError { kind, line }
    }

    fn detail(&self) -> String {
        match &self.kind {
            EvalErrorKind::Reference { name, .. } => {
                format!("ReferenceError: '{}' is not defined.", name)
            }
            EvalErrorKind::NotAFunction { name } => {
                format!("TypeError: '{}' is not a function.", name)
            }
            EvalErrorKind::MissingFunctionBody { name } => {
                format!("TypeError: function '{}' has no body.", name)
            }
            EvalErrorKind::InvalidOperand { op } => format!("Invalid '{}' expression.", op),
            EvalErrorKind::InvalidOperator { op } => format!("'{}' is invalid operator.", op),
            EvalErrorKind::DivisionByZero { op } => {
                format!("Invalid '{}' expression: division by zero.", op)
            }
            EvalErrorKind::AssignTarget => "Expected a variable before '='.".to_string(),
            EvalErrorKind::InvalidParameter => {
                "Invalid parameter in function prototype.".to_string()
            }
            EvalErrorKind::IllegalBreak => {
                "Uncaught SyntaxError: Illegal break statement".to_string()
            }
            EvalErrorKind::IllegalContinue => {
                "Uncaught SyntaxError: Illegal continue statement".to_string()
            }
            EvalErrorKind::IllegalReturn => {
                "Uncaught SyntaxError: Illegal return statement".to_string()
            }
        }
    }

    pub fn display_with_source(&self, source: &str) -> String {
        let help = match &self.kind {
            EvalErrorKind::Reference {
                suggestion: Some(s),
                ..
            } => Some(format!("did you mean '{}'?", paint(Color::Green, s))),
            _ => None,
        };
        render_line_context(&self.to_string(), source, self.line, help)
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Eval Error] in line: {} {}", self.line, self.detail())
    }
}

impl std::error::Error for EvalError {}

// ----------------------------------------------------------------------------
// Top-level wrapper
// ----------------------------------------------------------------------------

/// Any error the pipeline can produce, for drivers that run all three phases.
#[derive(Debug, Clone)]
pub enum Error {
    Lex(LexError),
    Parse(ParseError),
    Eval(EvalError),
}

impl Error {
    pub fn display_with_source(&self, source: &str) -> String {
        match self {
            Error::Lex(e) => e.display_with_source(source),
            Error::Parse(e) => e.display_with_source(source),
            Error::Eval(e) => e.display_with_source(source),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Lex(e) => e.fmt(f),
            Error::Parse(e) => e.fmt(f),
            Error::Eval(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Error::Lex(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<EvalError> for Error {
    fn from(e: EvalError) -> Self {
        Error::Eval(e)
    }
}

// ----------------------------------------------------------------------------
// Source-context rendering
// ----------------------------------------------------------------------------

/// Locate the line containing byte offset `at`.
/// Returns (1-based line number, line start offset, line content).
fn find_context(source: &str, at: usize) -> (usize, usize, &str) {
    let mut line_num = 1;
    let mut line_start = 0;

    for (i, c) in source.char_indices() {
        if i >= at {
            break;
        }
        if c == '\n' {
            line_num += 1;
            line_start = i + 1;
        }
    }

    let line_end = source[line_start..]
        .find('\n')
        .map(|off| line_start + off)
        .unwrap_or(source.len());

    (line_num, line_start, &source[line_start..line_end])
}

fn render_span_context(message: &str, source: &str, span: Span, help: Option<String>) -> String {
    let (line_num, line_start, line_content) = find_context(source, span.start);
    let col = span.start.saturating_sub(line_start);
    let len = (span.end.saturating_sub(span.start)).max(1);
    let underline = format!("{}{}", " ".repeat(col), "^".repeat(len));

    let error_label = paint(Color::ErrorLabel, "error");
    let line_num_str = paint(Color::Blue, &format!("{:4}", line_num));
    let pipe = paint(Color::Blue, "|");

    let mut result = format!(
        "{}: {}\n\n{} {} {}\n     {} {}",
        error_label,
        message,
        line_num_str,
        pipe,
        line_content,
        pipe,
        paint(Color::Red, &underline)
    );

    if let Some(help) = help {
        let hint = paint(Color::Cyan, "help");
        result.push_str(&format!("\n     {} {}: {}", pipe, hint, help));
    }

    result
}

fn render_line_context(message: &str, source: &str, line: u32, help: Option<String>) -> String {
    let content = source.lines().nth(line.saturating_sub(1) as usize).unwrap_or("");

    let error_label = paint(Color::ErrorLabel, "error");
    let line_num_str = paint(Color::Blue, &format!("{:4}", line));
    let pipe = paint(Color::Blue, "|");

    let mut result = format!(
        "{}: {}\n\n{} {} {}",
        error_label, message, line_num_str, pipe, content
    );

    if let Some(help) = help {
        let hint = paint(Color::Cyan, "help");
        result.push_str(&format!("\n     {} {}: {}", pipe, hint, help));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_message_template() {
        let e = LexError::new(LexErrorKind::UnterminatedString, 3, Span::new(10, 11));
        assert_eq!(
            e.to_string(),
            "[Lexer Error] line 3: unterminated string literal"
        );
    }

    #[test]
    fn parse_error_message_template() {
        let e = ParseError::new(
            ParseErrorKind::Expected { what: "')'" },
            2,
            Span::new(5, 6),
            ";".to_string(),
        );
        assert_eq!(
            e.to_string(),
            "Expected an ')'. [PARSER_ERROR] in line: 2, in token: ;"
        );
    }

    #[test]
    fn eval_error_message_template() {
        let e = EvalError::new(
            EvalErrorKind::Reference {
                name: "x".to_string(),
                suggestion: None,
            },
            7,
        );
        assert_eq!(
            e.to_string(),
            "[Eval Error] in line: 7 ReferenceError: 'x' is not defined."
        );
    }

    #[test]
    fn illegal_break_detail() {
        let e = EvalError::new(EvalErrorKind::IllegalBreak, 1);
        assert!(e
            .to_string()
            .contains("Uncaught SyntaxError: Illegal break statement"));
    }

    #[test]
    fn display_with_source_underlines_span() {
        let source = "var x = 1;\nprint(x +);\n";
        let e = ParseError::new(
            ParseErrorKind::UnknownToken,
            2,
            Span::new(20, 21),
            ")".to_string(),
        );
        let display = e.display_with_source(source);
        assert!(display.contains("print(x +);"), "got: {}", display);
        assert!(display.contains('^'), "got: {}", display);
    }

    #[test]
    fn display_with_source_includes_suggestion() {
        let source = "var total = 1;\nprint(totl);\n";
        let e = EvalError::new(
            EvalErrorKind::Reference {
                name: "totl".to_string(),
                suggestion: Some("total".to_string()),
            },
            2,
        );
        let display = e.display_with_source(source);
        assert!(display.contains("did you mean"), "got: {}", display);
        assert!(display.contains("total"), "got: {}", display);
    }

    #[test]
    fn wrapper_delegates_display() {
        let e: Error = LexError::new(LexErrorKind::UnterminatedString, 1, Span::new(0, 1)).into();
        assert!(e.to_string().starts_with("[Lexer Error]"));
    }
}
