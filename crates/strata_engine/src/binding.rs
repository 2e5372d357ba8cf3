//! Binding environment for rule evaluation.
//!
//! Variables are dense per-rule indices, so bindings live in a flat slot
//! array. Every binding is recorded on a trail; [`BindingEnv::push`] marks
//! the trail and [`BindingEnv::unwind`] undoes everything bound since the
//! matching mark, which is how the join backtracks.

use std::sync::Arc;

use strata_foundation::{Error, ErrorKind, Literal, Node, Result, Triple};
use strata_language::{Functor, PatternNode, Term, TriplePattern, Var};

/// Variable bindings of one rule evaluation.
#[derive(Clone, Debug, Default)]
pub struct BindingEnv {
    /// Current value of each variable.
    slots: Vec<Option<Node>>,
    /// Variables in the order they were bound.
    trail: Vec<Var>,
    /// Trail lengths recorded by `push`.
    marks: Vec<usize>,
}

impl BindingEnv {
    /// Creates an environment for a rule with `var_count` variables.
    #[must_use]
    pub fn new(var_count: usize) -> Self {
        Self {
            slots: vec![None; var_count],
            trail: Vec::new(),
            marks: Vec::new(),
        }
    }

    /// Opens a new binding scope.
    pub fn push(&mut self) {
        self.marks.push(self.trail.len());
    }

    /// Undoes every binding made since the matching [`push`](Self::push).
    pub fn unwind(&mut self) {
        let Some(mark) = self.marks.pop() else {
            return;
        };
        while self.trail.len() > mark {
            if let Some(var) = self.trail.pop() {
                self.slots[var.index()] = None;
            }
        }
    }

    /// Returns the current scope depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.marks.len()
    }

    /// Binds a variable.
    ///
    /// Succeeds without change if the variable already holds an equal value;
    /// fails on a conflicting value or an out-of-range variable.
    pub fn bind(&mut self, var: Var, value: Node) -> bool {
        let Some(slot) = self.slots.get_mut(var.index()) else {
            return false;
        };
        match slot {
            Some(existing) => *existing == value,
            None => {
                *slot = Some(value);
                self.trail.push(var);
                true
            }
        }
    }

    /// Returns the value bound to a variable.
    #[must_use]
    pub fn get(&self, var: Var) -> Option<&Node> {
        self.slots.get(var.index()).and_then(Option::as_ref)
    }

    /// Returns true if the variable is bound.
    #[must_use]
    pub fn is_bound(&self, var: Var) -> bool {
        self.get(var).is_some()
    }

    /// Returns the most ground version of a term: the bound value of a
    /// variable, or the term itself.
    #[must_use]
    pub fn resolve(&self, term: &Term) -> Term {
        match term {
            Term::Variable(var) => match self.get(*var) {
                Some(node) => Term::Constant(node.clone()),
                None => term.clone(),
            },
            _ => term.clone(),
        }
    }

    /// Returns the node a term stands for, if it is ground.
    #[must_use]
    pub fn value(&self, term: &Term) -> Option<Node> {
        match term {
            Term::Constant(node) => Some(node.clone()),
            Term::Variable(var) => self.get(*var).cloned(),
            Term::Wildcard => None,
        }
    }

    /// Returns the node a subject or object position stands for, if it is
    /// ground. A functor with every argument ground becomes a structured
    /// literal.
    #[must_use]
    pub fn pattern_value(&self, node: &PatternNode) -> Option<Node> {
        match node {
            PatternNode::Term(term) => self.value(term),
            PatternNode::Functor(functor) => self.structure(functor),
        }
    }

    fn structure(&self, functor: &Functor) -> Option<Node> {
        let args = functor
            .args
            .iter()
            .map(|arg| self.value(arg))
            .collect::<Option<Vec<_>>>()?;
        Some(Node::Literal(Literal::Structured(Arc::new(
            strata_foundation::Structure::new(functor.name.clone(), args),
        ))))
    }

    /// Unifies a term with a node, binding variables as needed.
    pub fn match_term(&mut self, term: &Term, node: &Node) -> bool {
        match term {
            Term::Constant(constant) => constant == node,
            Term::Variable(var) => self.bind(*var, node.clone()),
            Term::Wildcard => true,
        }
    }

    /// Unifies a subject or object position with a node.
    ///
    /// A functor matches a structured literal with the same name and arity
    /// whose arguments unify pairwise.
    pub fn match_node(&mut self, pattern: &PatternNode, node: &Node) -> bool {
        match pattern {
            PatternNode::Term(term) => self.match_term(term, node),
            PatternNode::Functor(functor) => {
                let Some(structure) = node.as_literal().and_then(Literal::as_structure) else {
                    return false;
                };
                structure.name == functor.name
                    && structure.args.len() == functor.args.len()
                    && functor
                        .args
                        .iter()
                        .zip(&structure.args)
                        .all(|(arg, value)| self.match_term(arg, value))
            }
        }
    }

    /// Unifies all three positions of a pattern with a statement.
    ///
    /// Bindings made before a failing position stay in place; callers wrap
    /// the attempt in [`push`](Self::push)/[`unwind`](Self::unwind).
    pub fn match_triple(&mut self, pattern: &TriplePattern, triple: &Triple) -> bool {
        self.match_node(&pattern.subject, &triple.subject)
            && self.match_term(&pattern.predicate, &triple.predicate)
            && self.match_node(&pattern.object, &triple.object)
    }

    /// Builds the concrete statement a pattern denotes under the current
    /// bindings.
    ///
    /// # Errors
    /// Returns an internal error if a position is still unbound; rule
    /// compilation guarantees head variables are bound by the body.
    pub fn instantiate(&self, pattern: &TriplePattern) -> Result<Triple> {
        let unbound = || {
            Error::new(ErrorKind::Internal(
                "head pattern instantiated with unbound positions".into(),
            ))
        };
        Ok(Triple::new(
            self.pattern_value(&pattern.subject).ok_or_else(unbound)?,
            self.value(&pattern.predicate).ok_or_else(unbound)?,
            self.pattern_value(&pattern.object).ok_or_else(unbound)?,
        ))
    }

    /// Returns the bound variables with their values, by index.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(Var, Node)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                let index = u32::try_from(i).ok()?;
                slot.clone().map(|node| (Var::new(index), node))
            })
            .collect()
    }
}
