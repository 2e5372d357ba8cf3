//! Syntax highlighting for the REPL.
//!
//! Colors come from the rule language's own lexer, so highlighting always
//! agrees with what the parser will see.

use std::borrow::Cow;

use strata_language::{Lexer, TokenKind};

/// Highlighter for rule syntax and REPL commands.
pub struct StrataHighlighter;

impl StrataHighlighter {
    /// Creates a new highlighter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn color(kind: &TokenKind) -> Option<&'static str> {
        let color = match kind {
            TokenKind::Comment(_) => "\x1b[2;3m",
            TokenKind::String(_) | TokenKind::At(_) => "\x1b[33m",
            TokenKind::Integer(_) | TokenKind::Decimal(_) => "\x1b[35m",
            TokenKind::Variable(_) | TokenKind::Star => "\x1b[34m",
            TokenKind::Iri(_) | TokenKind::PrefixedName { .. } | TokenKind::Blank(_) => {
                "\x1b[36m"
            }
            TokenKind::Ident(_) => "\x1b[32m",
            TokenKind::Arrow => "\x1b[1;32m",
            TokenKind::LParen | TokenKind::RParen | TokenKind::LBracket | TokenKind::RBracket => {
                "\x1b[1m"
            }
            TokenKind::Error(_) => "\x1b[31m",
            TokenKind::Dot | TokenKind::DoubleCaret | TokenKind::Eof => return None,
        };
        Some(color)
    }

    /// Highlight a line of input.
    #[allow(clippy::unused_self)]
    pub fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let (command, source) = split_command(line);
        let mut result = String::with_capacity(line.len() * 2);
        if !command.is_empty() {
            result.push_str("\x1b[1;35m");
            result.push_str(command);
            result.push_str("\x1b[0m");
        }

        let mut copied = 0;
        for token in Lexer::tokenize_all(source) {
            if token.kind == TokenKind::Eof {
                break;
            }
            let (start, end) = (token.span.start, token.span.end);
            result.push_str(&source[copied..start]);
            match Self::color(&token.kind) {
                Some(color) => {
                    result.push_str(color);
                    result.push_str(&source[start..end]);
                    result.push_str("\x1b[0m");
                }
                None => result.push_str(&source[start..end]),
            }
            copied = end;
        }
        result.push_str(&source[copied..]);
        Cow::Owned(result)
    }
}

/// Splits a leading `:command` word off a line.
fn split_command(line: &str) -> (&str, &str) {
    if !line.trim_start().starts_with(':') {
        return ("", line);
    }
    let end = line
        .char_indices()
        .skip_while(|(_, c)| c.is_whitespace())
        .find(|(_, c)| c.is_whitespace())
        .map_or(line.len(), |(i, _)| i);
    line.split_at(end)
}

impl Default for StrataHighlighter {
    fn default() -> Self {
        Self::new()
    }
}
