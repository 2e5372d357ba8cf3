//! Tokens and source spans for the rule language.
//!
//! Tokens are the output of the lexer and input to the parser. Every token
//! carries a [`Span`] so parse errors can point at the offending text.

/// A span of source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset where this span starts.
    pub start: usize,
    /// Byte offset where this span ends (exclusive).
    pub end: usize,
    /// 1-based line number where this span starts.
    pub line: u32,
    /// 1-based column number where this span starts.
    pub column: u32,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Creates a span covering the range from this span to another.
    #[must_use]
    pub const fn to(self, other: Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
            line: self.line,
            column: self.column,
        }
    }

    /// Returns the text this span covers in the given source.
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// The type and value of this token.
    pub kind: TokenKind,
    /// Source location of this token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Token types of the rule language.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Delimiters
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `.` ending a statement or unbracketed rule
    Dot,
    /// `->`
    Arrow,
    /// `^^` between a literal and its datatype
    DoubleCaret,
    /// `*`, the wildcard
    Star,

    // Nodes
    /// `<http://...>`, without the angle brackets
    Iri(String),
    /// `prefix:local`; either part may be empty
    PrefixedName {
        /// Text before the colon.
        prefix: String,
        /// Text after the colon.
        local: String,
    },
    /// `_:label`
    Blank(String),
    /// `?name`, without the question mark
    Variable(String),
    /// Quoted string with escapes resolved
    String(String),
    /// Integer literal, kept as lexical text
    Integer(String),
    /// Decimal literal, kept as lexical text
    Decimal(String),
    /// Bare word: functor names, `true`, `false`
    Ident(String),
    /// `@word`: a directive at top level or a language tag after a string
    At(String),

    // Meta
    /// Comment text (including the `#` or `//`)
    Comment(String),
    /// End of input
    Eof,
    /// Lexer error
    Error(String),
}

impl TokenKind {
    /// Returns true if this token kind should be ignored during parsing.
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        matches!(self, Self::Comment(_))
    }

    /// Returns a human-readable name for this token kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::Dot => "'.'",
            Self::Arrow => "'->'",
            Self::DoubleCaret => "'^^'",
            Self::Star => "'*'",
            Self::Iri(_) => "IRI",
            Self::PrefixedName { .. } => "prefixed name",
            Self::Blank(_) => "blank node",
            Self::Variable(_) => "variable",
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Ident(_) => "name",
            Self::At(_) => "'@' word",
            Self::Comment(_) => "comment",
            Self::Eof => "end of input",
            Self::Error(_) => "error",
        }
    }
}
