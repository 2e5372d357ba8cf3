//! Errors shared by every strata layer.
//!
//! An [`Error`] pairs a categorized [`ErrorKind`] with an optional
//! [`ErrorContext`] that records where it happened: a file position, plus the
//! rule and round frames the reasoner pushes while unwinding.

use std::fmt;

use thiserror::Error;

use crate::graph::GraphId;

/// Error returned by strata operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Where it went wrong, when known.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Wraps a kind with no context.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Replaces this error's context.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto this error's context, creating the context if
    /// there is none yet.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        let context = self.context.take().unwrap_or_default();
        self.context = Some(context.with_frame(frame));
        self
    }

    /// Creates a malformed-rule error.
    #[must_use]
    pub fn invalid_rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRule {
            rule: rule.into(),
            message: message.into(),
        })
    }

    /// Creates an unbound variable error.
    #[must_use]
    pub fn unbound_variable(rule: impl Into<String>, variable: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnboundVariable {
            rule: rule.into(),
            variable: variable.into(),
        })
    }

    /// Creates a store failure error.
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Store(message.into()))
    }

    /// Creates an unknown graph error.
    #[must_use]
    pub fn unknown_graph(id: GraphId) -> Self {
        Self::new(ErrorKind::UnknownGraph(id))
    }

    /// Creates an error for a tripped run limit.
    #[must_use]
    pub fn limit_exceeded(limit: SemanticLimit) -> Self {
        Self::new(ErrorKind::LimitExceeded(limit))
    }

    /// Returns true if this is a syntax error from the rule parser.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(self.kind, ErrorKind::ParseError { .. })
    }

    /// Returns true if this error signals a malformed rule set.
    #[must_use]
    pub const fn is_rule_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::InvalidRule { .. } | ErrorKind::UnboundVariable { .. }
        )
    }
}

/// Error categories.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Parse error in rule or fact source.
    #[error("parse error at {line}:{column}: {message}")]
    ParseError {
        /// What the parser expected or found.
        message: String,
        /// 1-based line.
        line: u32,
        /// 1-based column.
        column: u32,
        /// Text of the offending line.
        context: String,
    },

    /// A rule has a shape the engine cannot evaluate.
    #[error("invalid rule {rule}: {message}")]
    InvalidRule {
        /// Rule name (or a positional description for anonymous rules).
        rule: String,
        /// What is wrong with it.
        message: String,
    },

    /// A head variable was never bound by the rule body.
    #[error("unbound variable {variable} in rule {rule}")]
    UnboundVariable {
        /// Rule name.
        rule: String,
        /// Variable name, including the leading `?`.
        variable: String,
    },

    /// The graph store reported a failure.
    #[error("store error: {0}")]
    Store(String),

    /// A graph handle is not known to the store.
    #[error("unknown graph: {0:?}")]
    UnknownGraph(GraphId),

    /// A configured run limit was reached.
    #[error("limit exceeded: {0}")]
    LimitExceeded(SemanticLimit),

    /// I/O failure while reading rule or fact files.
    #[error("i/o error: {0}")]
    Io(String),

    /// Misuse of an API or a broken invariant.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Run limits a reasoner may be configured with.
///
/// None of these are enabled by default; the fixpoint loop only stops on
/// its own once a round derives nothing new.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticLimit {
    /// Maximum fixpoint rounds exceeded.
    MaxRounds {
        /// The configured limit.
        limit: u32,
    },
    /// Maximum derived facts per session exceeded.
    MaxDerivations {
        /// The configured limit.
        limit: usize,
        /// Additional context about which rule caused the issue.
        context: Option<String>,
    },
}

impl fmt::Display for SemanticLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxRounds { limit } => {
                write!(f, "max rounds ({limit}) exceeded")
            }
            Self::MaxDerivations { limit, context } => {
                write!(f, "max derivations ({limit}) exceeded")?;
                if let Some(rule) = context {
                    write!(f, ": {rule}")?;
                }
                Ok(())
            }
        }
    }
}

/// Location and unwinding frames attached to an [`Error`].
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// File or rule the error came from.
    pub source: Option<String>,
    /// 1-based line within `source`.
    pub line: Option<usize>,
    /// 1-based column within `source`.
    pub column: Option<usize>,
    /// Stack of rule/round frames.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// An empty context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            line: None,
            column: None,
            stack: Vec::new(),
        }
    }

    /// Records the file or rule name.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Records a position within the source.
    #[must_use]
    pub fn with_position(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    /// Appends a frame, innermost first.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            if let (Some(line), Some(column)) = (self.line, self.column) {
                write!(f, ":{line}:{column}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
