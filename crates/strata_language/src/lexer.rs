//! Lexer for the rule language.
//!
//! The lexer converts source text into a stream of tokens. Commas are
//! treated as whitespace, so `f(?a, ?b)` and `f(?a ?b)` lex identically.

use crate::token::{Span, Token, TokenKind};

/// Lexer for rule and fact sources.
pub struct Lexer<'src> {
    /// Source text being tokenized.
    source: &'src str,
    /// Remaining source text.
    rest: &'src str,
    /// Current byte offset in source.
    position: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    column: u32,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            rest: source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.position;
        let start_line = self.line;
        let start_column = self.column;

        let Some(c) = self.peek_char() else {
            return Token::new(
                TokenKind::Eof,
                Span::new(start, start, start_line, start_column),
            );
        };

        let kind = match c {
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '.' => self.single(TokenKind::Dot),
            '*' => self.single(TokenKind::Star),
            '#' => self.scan_comment(),
            '/' => {
                if self.peek_char_n(1) == Some('/') {
                    self.scan_comment()
                } else {
                    self.advance();
                    TokenKind::Error("unexpected character: /".into())
                }
            }
            '^' => {
                self.advance();
                if self.peek_char() == Some('^') {
                    self.advance();
                    TokenKind::DoubleCaret
                } else {
                    TokenKind::Error("expected '^^'".into())
                }
            }
            '<' => self.scan_iri(),
            '"' => self.scan_string(),
            '?' => self.scan_variable(),
            '@' => self.scan_at(),
            '-' if self.peek_char_n(1) == Some('>') => {
                self.advance();
                self.advance();
                TokenKind::Arrow
            }
            '-' | '+' if self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.scan_number()
            }
            c if c.is_ascii_digit() => self.scan_number(),
            '_' if self.peek_char_n(1) == Some(':') => self.scan_blank(),
            ':' => self.scan_name(),
            c if is_name_start(c) => self.scan_name(),
            c => {
                self.advance();
                TokenKind::Error(format!("unexpected character: {c}"))
            }
        };

        Token::new(
            kind,
            Span::new(start, self.position, start_line, start_column),
        )
    }

    /// Tokenizes all source and returns a vector of tokens.
    ///
    /// Comments are included in the output.
    #[must_use]
    pub fn tokenize_all(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn peek_char(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn peek_char_n(&self, n: usize) -> Option<char> {
        self.rest.chars().nth(n)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            let len = c.len_utf8();
            self.rest = &self.rest[len..];
            self.position += len;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || c == ',' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Scans a line comment starting with `#` or `//`.
    fn scan_comment(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        TokenKind::Comment(text)
    }

    /// Scans `<...>`. Whitespace inside an IRI is an error.
    fn scan_iri(&mut self) -> TokenKind {
        self.advance(); // consume '<'
        let start = self.position;
        loop {
            match self.peek_char() {
                Some('>') => {
                    let iri = self.source[start..self.position].to_string();
                    self.advance();
                    return if iri.is_empty() {
                        TokenKind::Error("empty IRI".into())
                    } else {
                        TokenKind::Iri(iri)
                    };
                }
                Some(c) if c.is_whitespace() => {
                    return TokenKind::Error("unterminated IRI".into());
                }
                Some(_) => self.advance(),
                None => return TokenKind::Error("unterminated IRI".into()),
            }
        }
    }

    fn scan_string(&mut self) -> TokenKind {
        self.advance(); // consume opening '"'
        let mut text = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.peek_char() {
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some(c) => {
                            return TokenKind::Error(format!("invalid escape sequence: \\{c}"));
                        }
                        None => {
                            return TokenKind::Error(
                                "unexpected end of input in string escape".into(),
                            );
                        }
                    };
                    self.advance();
                    text.push(escaped);
                }
                Some(c) => {
                    self.advance();
                    text.push(c);
                }
                None => {
                    return TokenKind::Error("unterminated string literal".into());
                }
            }
        }
        TokenKind::String(text)
    }

    fn scan_variable(&mut self) -> TokenKind {
        self.advance(); // consume '?'
        let name = self.scan_while(is_name_char);
        if name.is_empty() {
            TokenKind::Error("expected variable name after '?'".into())
        } else {
            TokenKind::Variable(name)
        }
    }

    fn scan_at(&mut self) -> TokenKind {
        self.advance(); // consume '@'
        let word = self.scan_while(|c| c.is_ascii_alphanumeric() || c == '-');
        if word.is_empty() {
            TokenKind::Error("expected a word after '@'".into())
        } else {
            TokenKind::At(word)
        }
    }

    fn scan_blank(&mut self) -> TokenKind {
        self.advance(); // '_'
        self.advance(); // ':'
        let label = self.scan_local();
        if label.is_empty() {
            TokenKind::Error("expected blank node label after '_:'".into())
        } else {
            TokenKind::Blank(label)
        }
    }

    /// Scans an integer or decimal, with optional sign.
    fn scan_number(&mut self) -> TokenKind {
        let start = self.position;
        let mut has_dot = false;

        if matches!(self.peek_char(), Some('-' | '+')) {
            self.advance();
        }

        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.'
                && !has_dot
                && self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit())
            {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        let text = self.source[start..self.position].to_string();
        if has_dot {
            TokenKind::Decimal(text)
        } else {
            TokenKind::Integer(text)
        }
    }

    /// Scans a bare word or a `prefix:local` name.
    fn scan_name(&mut self) -> TokenKind {
        let prefix = self.scan_while(is_name_char);
        if self.peek_char() != Some(':') {
            return TokenKind::Ident(prefix);
        }
        self.advance(); // consume ':'
        let local = self.scan_local();
        TokenKind::PrefixedName { prefix, local }
    }

    /// Scans a local name. Dots are allowed inside but not at the end, so a
    /// statement-terminating `.` is never swallowed.
    fn scan_local(&mut self) -> String {
        let start = self.position;
        while let Some(c) = self.peek_char() {
            if is_name_char(c) || c == ':' {
                self.advance();
            } else if c == '.' && self.peek_char_n(1).is_some_and(is_name_char) {
                self.advance();
            } else {
                break;
            }
        }
        self.source[start..self.position].to_string()
    }

    fn scan_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.position;
        while let Some(c) = self.peek_char() {
            if pred(c) {
                self.advance();
            } else {
                break;
            }
        }
        self.source[start..self.position].to_string()
    }
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}
