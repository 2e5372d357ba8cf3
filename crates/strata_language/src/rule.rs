//! The rule model produced by the parser.
//!
//! A [`Rule`] is an ordered body of [`ClauseEntry`]s and a head of clauses
//! to assert. Variables are dense per-rule indices ([`Var`]) assigned in
//! first-occurrence order; the names are kept on the rule for display and
//! error messages.

use std::fmt;
use std::sync::Arc;

use strata_foundation::{Literal, Node, Structure, Triple};

use crate::prefix::PrefixMap;
use crate::token::Span;

/// A rule variable, as a dense index into the rule's variable table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(u32);

impl Var {
    /// Creates a variable with the given index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the index as a `usize`.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// An atom in a clause position: a constant, a variable, or the wildcard.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Term {
    /// A ground node.
    Constant(Node),
    /// A rule variable.
    Variable(Var),
    /// `*`: matches anything and binds nothing.
    Wildcard,
}

impl Term {
    /// Returns the variable, if this is one.
    #[must_use]
    pub const fn as_var(&self) -> Option<Var> {
        match self {
            Self::Variable(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the constant, if this is one.
    #[must_use]
    pub const fn as_constant(&self) -> Option<&Node> {
        match self {
            Self::Constant(n) => Some(n),
            _ => None,
        }
    }
}

/// A named argument list.
///
/// In a body or head position a functor invokes a builtin; nested inside a
/// triple pattern it is a placeholder for a structured literal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Functor {
    /// Functor name.
    pub name: Arc<str>,
    /// Arguments.
    pub args: Vec<Term>,
}

impl Functor {
    /// Creates a functor.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, args: Vec<Term>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// Iterates the variables among the arguments.
    pub fn variables(&self) -> impl Iterator<Item = Var> + '_ {
        self.args.iter().filter_map(Term::as_var)
    }

    /// Returns the structured literal this functor denotes if every argument
    /// is a constant.
    #[must_use]
    pub fn to_structure(&self) -> Option<Structure> {
        let args = self
            .args
            .iter()
            .map(|a| a.as_constant().cloned())
            .collect::<Option<Vec<_>>>()?;
        Some(Structure::new(self.name.clone(), args))
    }
}

/// A subject or object position of a triple pattern.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PatternNode {
    /// A plain term.
    Term(Term),
    /// A nested functor standing for a structured literal.
    Functor(Functor),
}

impl PatternNode {
    /// Iterates the variables in this position.
    pub fn variables(&self) -> Box<dyn Iterator<Item = Var> + '_> {
        match self {
            Self::Term(t) => Box::new(t.as_var().into_iter()),
            Self::Functor(f) => Box::new(f.variables()),
        }
    }

    /// Returns the node for this position if it is ground.
    #[must_use]
    pub fn ground(&self) -> Option<Node> {
        match self {
            Self::Term(t) => t.as_constant().cloned(),
            Self::Functor(f) => f
                .to_structure()
                .map(|s| Node::Literal(Literal::Structured(Arc::new(s)))),
        }
    }
}

impl From<Term> for PatternNode {
    fn from(term: Term) -> Self {
        Self::Term(term)
    }
}

/// A `(subject predicate object)` pattern.
///
/// The predicate is a [`Term`]: functors are not allowed in predicate
/// position, and the parser rejects them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    /// Subject position.
    pub subject: PatternNode,
    /// Predicate position.
    pub predicate: Term,
    /// Object position.
    pub object: PatternNode,
}

impl TriplePattern {
    /// Creates a triple pattern.
    #[must_use]
    pub fn new(
        subject: impl Into<PatternNode>,
        predicate: Term,
        object: impl Into<PatternNode>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }

    /// Iterates the variables in subject, predicate, object order.
    pub fn variables(&self) -> impl Iterator<Item = Var> + '_ {
        self.subject
            .variables()
            .chain(self.predicate.as_var())
            .chain(self.object.variables())
    }

    /// Returns the triple this pattern denotes if every position is ground.
    #[must_use]
    pub fn ground(&self) -> Option<Triple> {
        Some(Triple::new(
            self.subject.ground()?,
            self.predicate.as_constant()?.clone(),
            self.object.ground()?,
        ))
    }

    /// Returns true if every position is the wildcard or an unbound
    /// variable, so the pattern matches any statement.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        let open = |n: &PatternNode| matches!(n, PatternNode::Term(Term::Wildcard | Term::Variable(_)));
        open(&self.subject)
            && matches!(self.predicate, Term::Wildcard | Term::Variable(_))
            && open(&self.object)
    }
}

/// One clause of a rule body or head.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClauseEntry {
    /// A triple pattern.
    Triple(TriplePattern),
    /// A builtin invocation.
    Functor(Functor),
    /// A bracketed rule nested inside another.
    Rule(Box<Rule>),
}

impl ClauseEntry {
    /// Returns the triple pattern, if this is one.
    #[must_use]
    pub const fn as_triple(&self) -> Option<&TriplePattern> {
        match self {
            Self::Triple(t) => Some(t),
            _ => None,
        }
    }
}

/// A forward rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rule {
    /// Optional rule name.
    pub name: Option<Arc<str>>,
    /// Body clauses, all of which must match.
    pub body: Vec<ClauseEntry>,
    /// Head clauses, asserted for every body match.
    pub head: Vec<ClauseEntry>,
    /// Variable names indexed by [`Var`].
    pub variables: Vec<Arc<str>>,
    /// Where the rule starts in its source.
    pub span: Span,
}

impl Rule {
    /// Returns true if the rule has an empty body.
    ///
    /// Axioms are asserted once before the fixpoint starts.
    #[must_use]
    pub fn is_axiom(&self) -> bool {
        self.body.is_empty()
    }

    /// Returns the number of distinct variables in the rule.
    #[must_use]
    pub fn var_count(&self) -> usize {
        self.variables.len()
    }

    /// Returns the source name of a variable, without the `?`.
    #[must_use]
    pub fn var_name(&self, var: Var) -> &str {
        self.variables.get(var.index()).map_or("_", |n| n.as_ref())
    }

    /// Returns the rule name, or a description of where an anonymous rule
    /// was defined.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.to_string(),
            None => format!("<rule at line {}>", self.span.line),
        }
    }
}

/// A parsed rule file: rules in source order plus the prefixes in effect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleSet {
    /// Rules in source order.
    pub rules: Vec<Rule>,
    /// Prefixes declared in (or defaulted for) the source.
    pub prefixes: PrefixMap,
}

impl RuleSet {
    /// Creates a rule set.
    #[must_use]
    pub fn new(rules: Vec<Rule>, prefixes: PrefixMap) -> Self {
        Self { rules, prefixes }
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates the rules with an empty body.
    pub fn axioms(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.is_axiom())
    }

    /// Iterates the rules that take part in the fixpoint.
    pub fn ordinary(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| !r.is_axiom())
    }

    /// Appends the rules and prefixes of another set.
    pub fn extend(&mut self, other: RuleSet) {
        self.prefixes.extend(&other.prefixes);
        self.rules.extend(other.rules);
    }

    /// Finds a rule by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name.as_deref() == Some(name))
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}
