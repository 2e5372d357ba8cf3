//! Builtin predicates and actions.
//!
//! A functor clause in a rule body calls a [`Builtin`] as a test (or to bind
//! an output variable); a functor clause in a head calls it as an action.
//! The standard set is registered by [`BuiltinRegistry::standard`] and
//! callers may add their own.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use strata_foundation::{Literal, Node, Result};
use strata_language::{Term, format_node};
use strata_storage::Lookup;

use crate::binding::BindingEnv;

/// Read access to the facts visible to a rule, for builtins such as
/// `noValue`.
pub trait FactSource {
    /// Returns true if at least one visible statement matches.
    ///
    /// # Errors
    /// Propagates store failures.
    fn has_match(&self, lookup: &Lookup) -> Result<bool>;
}

/// Accepted argument counts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arity {
    min: usize,
    max: Option<usize>,
}

impl Arity {
    /// Exactly `n` arguments.
    #[must_use]
    pub const fn exactly(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    /// Between `min` and `max` arguments, inclusive.
    #[must_use]
    pub const fn range(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// At least `n` arguments.
    #[must_use]
    pub const fn at_least(n: usize) -> Self {
        Self { min: n, max: None }
    }

    /// Returns true if `n` arguments are accepted.
    #[must_use]
    pub fn accepts(self, n: usize) -> bool {
        n >= self.min && self.max.is_none_or(|max| n <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{max}"),
            Some(max) => write!(f, "{}..={max}", self.min),
            None => write!(f, "{} or more", self.min),
        }
    }
}

/// One invocation of a builtin.
pub struct Call<'a> {
    args: &'a [Term],
    env: &'a mut BindingEnv,
    facts: &'a dyn FactSource,
    output: &'a mut Vec<String>,
}

impl<'a> Call<'a> {
    /// Creates a call.
    pub fn new(
        args: &'a [Term],
        env: &'a mut BindingEnv,
        facts: &'a dyn FactSource,
        output: &'a mut Vec<String>,
    ) -> Self {
        Self {
            args,
            env,
            facts,
            output,
        }
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Returns true if the call has no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Returns the value of argument `i`, if ground.
    #[must_use]
    pub fn value(&self, i: usize) -> Option<Node> {
        self.args.get(i).and_then(|arg| self.env.value(arg))
    }

    /// Returns true if argument `i` is ground.
    #[must_use]
    pub fn is_bound(&self, i: usize) -> bool {
        self.value(i).is_some()
    }

    /// Binds argument `i` to a value, or checks it against the value it
    /// already has. A wildcard argument accepts anything.
    pub fn bind(&mut self, i: usize, value: Node) -> bool {
        match self.args.get(i) {
            Some(arg) => self.env.match_term(arg, &value),
            None => false,
        }
    }

    /// Returns the facts visible to the rule.
    #[must_use]
    pub fn facts(&self) -> &dyn FactSource {
        self.facts
    }

    /// Emits a line of output.
    pub fn emit(&mut self, line: String) {
        self.output.push(line);
    }
}

/// A builtin predicate or action.
pub trait Builtin: Send + Sync {
    /// Name used in rule source.
    fn name(&self) -> &str;

    /// Accepted argument counts.
    fn arity(&self) -> Arity;

    /// Index of the argument this builtin binds, if any. Every other
    /// argument is an input.
    fn output(&self, _arg_count: usize) -> Option<usize> {
        None
    }

    /// Whether the builtin may appear in a rule body.
    fn in_body(&self) -> bool {
        true
    }

    /// Whether the builtin may appear in a rule head.
    fn in_head(&self) -> bool {
        false
    }

    /// Runs the builtin. In a body, `false` fails the current match.
    ///
    /// # Errors
    /// Propagates failures from the fact source.
    fn evaluate(&self, call: &mut Call<'_>) -> Result<bool>;
}

/// Builtins by name.
#[derive(Clone, Default)]
pub struct BuiltinRegistry {
    builtins: HashMap<String, Arc<dyn Builtin>>,
}

impl BuiltinRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the standard builtins.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for compare in [
            Compare::Equal,
            Compare::NotEqual,
            Compare::LessThan,
            Compare::GreaterThan,
            Compare::LessOrEqual,
            Compare::GreaterOrEqual,
        ] {
            registry.register(Arc::new(compare));
        }
        for check in [
            KindCheck::Literal,
            KindCheck::Blank,
            KindCheck::Functor,
        ] {
            registry.register(Arc::new(IsKind(check)));
            registry.register(Arc::new(NotKind(check)));
        }
        registry.register(Arc::new(Bound { want_bound: true }));
        registry.register(Arc::new(Bound { want_bound: false }));
        registry.register(Arc::new(NoValue));
        for op in [Arith::Sum, Arith::Difference, Arith::Product] {
            registry.register(Arc::new(op));
        }
        registry.register(Arc::new(StrConcat));
        registry.register(Arc::new(Print));
        registry
    }

    /// Adds or replaces a builtin.
    pub fn register(&mut self, builtin: Arc<dyn Builtin>) {
        self.builtins.insert(builtin.name().to_string(), builtin);
    }

    /// Looks up a builtin by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Builtin>> {
        self.builtins.get(name).cloned()
    }

    /// Returns the registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.builtins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for BuiltinRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinRegistry")
            .field("builtins", &self.names())
            .finish()
    }
}

// =============================================================================
// Value helpers
// =============================================================================

/// A numeric view of a literal.
#[derive(Clone, Copy, Debug)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn of(node: &Node) -> Option<Self> {
        let literal = node.as_literal()?;
        if let Some(i) = literal.as_integer() {
            return Some(Self::Int(i));
        }
        literal.as_f64().map(Self::Float)
    }

    fn as_f64(self) -> f64 {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    fn compare(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }

    fn into_node(self) -> Node {
        match self {
            Self::Int(i) => Node::integer(i),
            Self::Float(f) => Node::Literal(Literal::decimal(f)),
        }
    }
}

/// Compares two nodes: numerically when both are numbers, by identity
/// otherwise. Non-numeric nodes are only ever equal or unordered.
fn compare_nodes(a: &Node, b: &Node) -> Option<Ordering> {
    match (Number::of(a), Number::of(b)) {
        (Some(x), Some(y)) => x.compare(y),
        _ if a == b => Some(Ordering::Equal),
        _ => None,
    }
}

/// Text of a node for string builtins: the lexical form of literals, the
/// IRI of resources, the label of blank nodes.
fn node_text(node: &Node) -> String {
    match node {
        Node::Resource(iri) => iri.as_str().to_string(),
        Node::Blank(id) => id.as_str().to_string(),
        Node::Literal(literal) => literal
            .lexical()
            .map_or_else(|| literal.to_string(), str::to_string),
    }
}

// =============================================================================
// Standard builtins
// =============================================================================

#[derive(Clone, Copy)]
enum Compare {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,
}

impl Builtin for Compare {
    fn name(&self) -> &str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "notEqual",
            Self::LessThan => "lessThan",
            Self::GreaterThan => "greaterThan",
            Self::LessOrEqual => "le",
            Self::GreaterOrEqual => "ge",
        }
    }

    fn arity(&self) -> Arity {
        Arity::exactly(2)
    }

    fn evaluate(&self, call: &mut Call<'_>) -> Result<bool> {
        let (Some(a), Some(b)) = (call.value(0), call.value(1)) else {
            return Ok(false);
        };
        let ordering = compare_nodes(&a, &b);
        Ok(match self {
            Self::Equal => ordering == Some(Ordering::Equal),
            Self::NotEqual => ordering != Some(Ordering::Equal),
            Self::LessThan => ordering == Some(Ordering::Less),
            Self::GreaterThan => ordering == Some(Ordering::Greater),
            Self::LessOrEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            Self::GreaterOrEqual => {
                matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
            }
        })
    }
}

#[derive(Clone, Copy)]
enum KindCheck {
    Literal,
    Blank,
    Functor,
}

impl KindCheck {
    fn holds(self, node: &Node) -> bool {
        match self {
            Self::Literal => node.is_literal() && !node.is_structure(),
            Self::Blank => node.is_blank(),
            Self::Functor => node.is_structure(),
        }
    }
}

struct IsKind(KindCheck);

impl Builtin for IsKind {
    fn name(&self) -> &str {
        match self.0 {
            KindCheck::Literal => "isLiteral",
            KindCheck::Blank => "isBNode",
            KindCheck::Functor => "isFunctor",
        }
    }

    fn arity(&self) -> Arity {
        Arity::exactly(1)
    }

    fn evaluate(&self, call: &mut Call<'_>) -> Result<bool> {
        Ok(call.value(0).is_some_and(|node| self.0.holds(&node)))
    }
}

struct NotKind(KindCheck);

impl Builtin for NotKind {
    fn name(&self) -> &str {
        match self.0 {
            KindCheck::Literal => "notLiteral",
            KindCheck::Blank => "notBNode",
            KindCheck::Functor => "notFunctor",
        }
    }

    fn arity(&self) -> Arity {
        Arity::exactly(1)
    }

    fn evaluate(&self, call: &mut Call<'_>) -> Result<bool> {
        Ok(!call.value(0).is_some_and(|node| self.0.holds(&node)))
    }
}

/// `bound(?x ...)` and `unbound(?x ...)`.
///
/// Like every body builtin these run once all variables a pattern binds
/// are bound, so they only distinguish variables that no body pattern
/// mentions: `bound(?x)` on a pattern variable always succeeds and
/// `unbound(?x)` always fails.
struct Bound {
    want_bound: bool,
}

impl Builtin for Bound {
    fn name(&self) -> &str {
        if self.want_bound { "bound" } else { "unbound" }
    }

    fn arity(&self) -> Arity {
        Arity::at_least(1)
    }

    fn evaluate(&self, call: &mut Call<'_>) -> Result<bool> {
        Ok((0..call.len()).all(|i| call.is_bound(i) == self.want_bound))
    }
}

/// `noValue(s, p)` / `noValue(s, p, o)`: no visible statement matches.
/// Unbound arguments match anything.
struct NoValue;

impl Builtin for NoValue {
    fn name(&self) -> &str {
        "noValue"
    }

    fn arity(&self) -> Arity {
        Arity::range(2, 3)
    }

    fn evaluate(&self, call: &mut Call<'_>) -> Result<bool> {
        let lookup = Lookup::new(call.value(0), call.value(1), call.value(2));
        Ok(!call.facts().has_match(&lookup)?)
    }
}

#[derive(Clone, Copy)]
enum Arith {
    Sum,
    Difference,
    Product,
}

impl Arith {
    fn apply(self, a: Number, b: Number) -> Option<Number> {
        match (a, b) {
            (Number::Int(x), Number::Int(y)) => match self {
                Self::Sum => x.checked_add(y),
                Self::Difference => x.checked_sub(y),
                Self::Product => x.checked_mul(y),
            }
            .map(Number::Int),
            (x, y) => {
                let (x, y) = (x.as_f64(), y.as_f64());
                let result = match self {
                    Self::Sum => x + y,
                    Self::Difference => x - y,
                    Self::Product => x * y,
                };
                result.is_finite().then_some(Number::Float(result))
            }
        }
    }
}

impl Builtin for Arith {
    fn name(&self) -> &str {
        match self {
            Self::Sum => "sum",
            Self::Difference => "difference",
            Self::Product => "product",
        }
    }

    fn arity(&self) -> Arity {
        Arity::exactly(3)
    }

    fn output(&self, _arg_count: usize) -> Option<usize> {
        Some(2)
    }

    fn evaluate(&self, call: &mut Call<'_>) -> Result<bool> {
        let (Some(a), Some(b)) = (
            call.value(0).as_ref().and_then(Number::of),
            call.value(1).as_ref().and_then(Number::of),
        ) else {
            return Ok(false);
        };
        let Some(result) = self.apply(a, b) else {
            return Ok(false);
        };
        // An already-bound output is compared by value, so 5 matches 5.0.
        if let Some(existing) = call.value(2) {
            return Ok(Number::of(&existing)
                .and_then(|e| e.compare(result))
                .is_some_and(Ordering::is_eq));
        }
        Ok(call.bind(2, result.into_node()))
    }
}

/// `strConcat(a, ..., out)`: binds `out` to the concatenated text of the
/// other arguments as a plain literal.
struct StrConcat;

impl Builtin for StrConcat {
    fn name(&self) -> &str {
        "strConcat"
    }

    fn arity(&self) -> Arity {
        Arity::at_least(2)
    }

    fn output(&self, arg_count: usize) -> Option<usize> {
        arg_count.checked_sub(1)
    }

    fn evaluate(&self, call: &mut Call<'_>) -> Result<bool> {
        let last = call.len() - 1;
        let mut text = String::new();
        for i in 0..last {
            let Some(node) = call.value(i) else {
                return Ok(false);
            };
            text.push_str(&node_text(&node));
        }
        Ok(call.bind(last, Node::literal(text)))
    }
}

/// `print(...)`: writes its arguments to the reasoner output.
struct Print;

impl Builtin for Print {
    fn name(&self) -> &str {
        "print"
    }

    fn arity(&self) -> Arity {
        Arity::at_least(0)
    }

    fn in_head(&self) -> bool {
        true
    }

    fn evaluate(&self, call: &mut Call<'_>) -> Result<bool> {
        let line = (0..call.len())
            .map(|i| match call.value(i) {
                Some(Node::Literal(Literal::Plain(text))) => text.to_string(),
                Some(node) => format_node(&node, None),
                None => "_".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ");
        call.emit(line);
        Ok(true)
    }
}
