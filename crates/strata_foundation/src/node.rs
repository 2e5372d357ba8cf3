//! Ground RDF terms and triples.
//!
//! Nodes are immutable and cheaply cloneable: every string payload is an
//! `Arc<str>`, so copying a node into a binding slot or a pending buffer
//! never copies text.

use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::vocab::xsd;

// =============================================================================
// Identifiers
// =============================================================================

/// An absolute resource identifier.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Iri(Arc<str>);

impl Iri {
    /// Creates an IRI from its full text (without angle brackets).
    #[must_use]
    pub fn new(iri: impl Into<Arc<str>>) -> Self {
        Self(iri.into())
    }

    /// Returns the IRI text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

/// A blank node label, scoped to the store that holds it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlankId(Arc<str>);

impl BlankId {
    /// Creates a blank node label (without the `_:` prefix).
    #[must_use]
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self(label.into())
    }

    /// Returns the label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BlankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.0)
    }
}

// =============================================================================
// Literals
// =============================================================================

/// A ground functor value: `name(arg, ...)`.
///
/// This is what a functor placeholder in a rule head turns into once its
/// arguments are bound. It is stored as a literal since it can only ever
/// appear in subject/object position of derived facts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Structure {
    /// Functor name.
    pub name: Arc<str>,
    /// Ground arguments.
    pub args: Vec<Node>,
}

impl Structure {
    /// Creates a new structure.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, args: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// A literal value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Literal {
    /// Plain string: `"text"`.
    Plain(Arc<str>),
    /// Language-tagged string: `"text"@en`.
    Lang {
        /// Lexical form.
        lexical: Arc<str>,
        /// Language tag (without `@`).
        language: Arc<str>,
    },
    /// Datatyped literal: `"42"^^xsd:integer`.
    Typed {
        /// Lexical form.
        lexical: Arc<str>,
        /// Datatype IRI.
        datatype: Iri,
    },
    /// Structured functor value.
    Structured(Arc<Structure>),
}

impl Literal {
    /// Creates a plain string literal.
    #[must_use]
    pub fn plain(text: impl Into<Arc<str>>) -> Self {
        Self::Plain(text.into())
    }

    /// Creates a language-tagged literal.
    #[must_use]
    pub fn lang(text: impl Into<Arc<str>>, language: impl Into<Arc<str>>) -> Self {
        Self::Lang {
            lexical: text.into(),
            language: language.into(),
        }
    }

    /// Creates a datatyped literal.
    #[must_use]
    pub fn typed(text: impl Into<Arc<str>>, datatype: Iri) -> Self {
        Self::Typed {
            lexical: text.into(),
            datatype,
        }
    }

    /// Creates an `xsd:integer` literal.
    #[must_use]
    pub fn integer(n: i64) -> Self {
        Self::typed(n.to_string(), Iri::new(xsd::INTEGER))
    }

    /// Creates an `xsd:decimal` literal.
    #[must_use]
    pub fn decimal(n: f64) -> Self {
        Self::typed(format_decimal(n), Iri::new(xsd::DECIMAL))
    }

    /// Creates an `xsd:boolean` literal.
    #[must_use]
    pub fn boolean(b: bool) -> Self {
        Self::typed(if b { "true" } else { "false" }, Iri::new(xsd::BOOLEAN))
    }

    /// Returns the lexical form, or `None` for structured values.
    #[must_use]
    pub fn lexical(&self) -> Option<&str> {
        match self {
            Self::Plain(s) | Self::Lang { lexical: s, .. } | Self::Typed { lexical: s, .. } => {
                Some(s)
            }
            Self::Structured(_) => None,
        }
    }

    /// Returns the structure if this is a structured functor value.
    #[must_use]
    pub fn as_structure(&self) -> Option<&Structure> {
        match self {
            Self::Structured(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer if it is an integral numeric literal.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Typed { lexical, datatype } if xsd::is_integral(datatype.as_str()) => {
                lexical.trim().parse().ok()
            }
            _ => None,
        }
    }

    /// Returns the value as a float if it is any numeric literal.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Typed { lexical, datatype } if xsd::is_numeric(datatype.as_str()) => {
                lexical.trim().parse().ok()
            }
            _ => None,
        }
    }
}

fn format_decimal(n: f64) -> String {
    let s = n.to_string();
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{s}.0")
    }
}

// =============================================================================
// Node
// =============================================================================

/// A ground RDF term.
///
/// Nodes are the constant domain of the rule engine: every fact in the store
/// and every value a rule variable can be bound to is a `Node`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Node {
    /// A named resource.
    Resource(Iri),
    /// A blank node.
    Blank(BlankId),
    /// A literal value.
    Literal(Literal),
}

impl Node {
    /// Creates a resource node.
    #[must_use]
    pub fn resource(iri: impl Into<Arc<str>>) -> Self {
        Self::Resource(Iri::new(iri))
    }

    /// Creates a blank node.
    #[must_use]
    pub fn blank(label: impl Into<Arc<str>>) -> Self {
        Self::Blank(BlankId::new(label))
    }

    /// Creates a plain literal node.
    #[must_use]
    pub fn literal(text: impl Into<Arc<str>>) -> Self {
        Self::Literal(Literal::plain(text))
    }

    /// Creates an `xsd:integer` literal node.
    #[must_use]
    pub fn integer(n: i64) -> Self {
        Self::Literal(Literal::integer(n))
    }

    /// Returns true if this node is a literal.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Returns true if this node is a blank node.
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        matches!(self, Self::Blank(_))
    }

    /// Returns true if this node is a named resource.
    #[must_use]
    pub const fn is_resource(&self) -> bool {
        matches!(self, Self::Resource(_))
    }

    /// Returns true if this node is a structured functor value.
    #[must_use]
    pub fn is_structure(&self) -> bool {
        matches!(self, Self::Literal(Literal::Structured(_)))
    }

    /// Attempts to extract the IRI.
    #[must_use]
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Self::Resource(iri) => Some(iri),
            _ => None,
        }
    }

    /// Attempts to extract the literal.
    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

impl From<Iri> for Node {
    fn from(iri: Iri) -> Self {
        Self::Resource(iri)
    }
}

impl From<Literal> for Node {
    fn from(lit: Literal) -> Self {
        Self::Literal(lit)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource(iri) => write!(f, "{iri}"),
            Self::Blank(id) => write!(f, "_:{}", id.as_str()),
            Self::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(s) => write_quoted(f, s),
            Self::Lang { lexical, language } => {
                write_quoted(f, lexical)?;
                write!(f, "@{language}")
            }
            Self::Typed { lexical, datatype } => {
                write_quoted(f, lexical)?;
                write!(f, "^^{datatype}")
            }
            Self::Structured(s) => {
                write!(f, "{}(", s.name)?;
                for (i, arg) in s.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "\"")
}

// =============================================================================
// Triple
// =============================================================================

/// A ground subject-predicate-object statement.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Triple {
    /// Subject.
    pub subject: Node,
    /// Predicate.
    pub predicate: Node,
    /// Object.
    pub object: Node,
}

impl Triple {
    /// Creates a new triple.
    #[must_use]
    pub fn new(subject: Node, predicate: Node, object: Node) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Returns true if this triple is a legal RDF statement: the subject is
    /// not a literal and the predicate is a named resource.
    #[must_use]
    pub fn is_valid_statement(&self) -> bool {
        !self.subject.is_literal() && self.predicate.is_resource()
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.subject, self.predicate, self.object)
    }
}

impl fmt::Debug for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
