//! Rule compilation.
//!
//! Each ordinary rule is compiled once into a [`RulePlan`]: the order in
//! which body clauses are matched plus the head actions to run for every
//! complete match. Compilation is where malformed rules are rejected, so
//! a bad rule set fails before any round writes to the store.

use std::sync::Arc;

use strata_foundation::{Error, Result, Triple};
use strata_language::{ClauseEntry, Functor, PatternNode, Rule, Term, TriplePattern, Var};

use crate::builtin::{Builtin, BuiltinRegistry};

/// One step of a body join.
#[derive(Clone)]
pub enum Step {
    /// Look up statements matching a pattern and unify with each.
    Match(TriplePattern),
    /// Evaluate a builtin test.
    Call {
        /// The clause as written.
        functor: Functor,
        /// The resolved builtin.
        builtin: Arc<dyn Builtin>,
    },
}

/// One action of a rule head.
#[derive(Clone)]
pub enum HeadAction {
    /// Derive a statement.
    Assert(TriplePattern),
    /// Run a head builtin such as `print`.
    Invoke {
        /// The clause as written.
        functor: Functor,
        /// The resolved builtin.
        builtin: Arc<dyn Builtin>,
    },
}

/// A compiled ordinary rule.
#[derive(Clone)]
pub struct RulePlan {
    /// Rule label used in stats, events and provenance.
    pub label: String,
    /// Body steps in evaluation order.
    pub steps: Vec<Step>,
    /// Head actions in source order.
    pub head: Vec<HeadAction>,
    /// Number of variables in the rule.
    pub var_count: usize,
    /// Number of triple patterns in the body.
    pub pattern_count: usize,
    /// Source names of variables, by index.
    pub var_names: Vec<Arc<str>>,
}

impl RulePlan {
    /// Compiles a rule with a non-empty body.
    ///
    /// Triple patterns are matched right to left. Each builtin runs as soon
    /// as every input variable is bound; one whose inputs are never bound
    /// by a pattern runs last. Only a builtin's output argument counts as
    /// bound afterwards, so a head may not use a variable that appears
    /// only as a builtin input.
    ///
    /// # Errors
    /// Returns `InvalidRule` for nested rules, unknown builtins, bad arity,
    /// builtins used where they are not allowed, or wildcards in the head,
    /// and `UnboundVariable` for head variables the body never binds.
    pub fn compile(rule: &Rule, registry: &BuiltinRegistry) -> Result<Self> {
        let label = rule.label();
        let mut patterns = Vec::new();
        let mut calls = Vec::new();
        for clause in &rule.body {
            match clause {
                ClauseEntry::Triple(pattern) => patterns.push(pattern),
                ClauseEntry::Functor(functor) => {
                    let builtin = resolve(&label, functor, registry)?;
                    if !builtin.in_body() {
                        return Err(Error::invalid_rule(
                            &label,
                            format!("builtin {} cannot be used in a rule body", functor.name),
                        ));
                    }
                    calls.push((functor, builtin));
                }
                ClauseEntry::Rule(_) => {
                    return Err(Error::invalid_rule(&label, "nested rule in rule body"));
                }
            }
        }

        let mut bound = vec![false; rule.var_count()];
        let mut steps = Vec::with_capacity(rule.body.len());
        place_ready(&mut calls, &mut bound, &mut steps);
        for pattern in patterns.iter().rev() {
            steps.push(Step::Match((*pattern).clone()));
            mark(&mut bound, pattern.variables());
            place_ready(&mut calls, &mut bound, &mut steps);
        }
        for (functor, builtin) in calls {
            mark_output(&mut bound, functor, builtin.as_ref());
            steps.push(Step::Call {
                functor: functor.clone(),
                builtin,
            });
        }

        let head = compile_head(rule, &label, registry, &bound)?;

        Ok(Self {
            label,
            steps,
            head,
            var_count: rule.var_count(),
            pattern_count: patterns.len(),
            var_names: rule.variables.clone(),
        })
    }

    /// Returns the triple patterns of the body in evaluation order.
    pub fn patterns(&self) -> impl Iterator<Item = &TriplePattern> {
        self.steps.iter().filter_map(|step| match step {
            Step::Match(pattern) => Some(pattern),
            Step::Call { .. } => None,
        })
    }

    /// Returns the source name of a variable, with its `?`.
    #[must_use]
    pub fn var_name(&self, var: Var) -> String {
        self.var_names
            .get(var.index())
            .map_or_else(|| var.to_string(), |name| format!("?{name}"))
    }
}

fn resolve(label: &str, functor: &Functor, registry: &BuiltinRegistry) -> Result<Arc<dyn Builtin>> {
    let builtin = registry.get(&functor.name).ok_or_else(|| {
        Error::invalid_rule(label, format!("unknown builtin {}", functor.name))
    })?;
    let arity = builtin.arity();
    if !arity.accepts(functor.args.len()) {
        return Err(Error::invalid_rule(
            label,
            format!(
                "builtin {} takes {arity} arguments, got {}",
                functor.name,
                functor.args.len()
            ),
        ));
    }
    Ok(builtin)
}

fn mark(bound: &mut [bool], vars: impl Iterator<Item = Var>) {
    for var in vars {
        if let Some(slot) = bound.get_mut(var.index()) {
            *slot = true;
        }
    }
}

/// Marks the variable a builtin binds. Inputs are never marked: a test
/// such as `notLiteral(?x)` succeeds with `?x` unbound and binds nothing.
fn mark_output(bound: &mut [bool], functor: &Functor, builtin: &dyn Builtin) {
    let output = builtin.output(functor.args.len());
    if let Some(Term::Variable(var)) = output.and_then(|i| functor.args.get(i)) {
        mark(bound, std::iter::once(*var));
    }
}

/// Moves every builtin whose inputs are all bound into `steps`, marking
/// its output as bound. Repeats until nothing more becomes ready.
fn place_ready(
    calls: &mut Vec<(&Functor, Arc<dyn Builtin>)>,
    bound: &mut [bool],
    steps: &mut Vec<Step>,
) {
    while let Some(i) = calls.iter().position(|(functor, builtin)| {
        let output = builtin.output(functor.args.len());
        functor.args.iter().enumerate().all(|(j, arg)| match arg {
            Term::Variable(var) if Some(j) != output => {
                bound.get(var.index()).copied().unwrap_or(false)
            }
            _ => true,
        })
    }) {
        let (functor, builtin) = calls.remove(i);
        mark_output(bound, functor, builtin.as_ref());
        steps.push(Step::Call {
            functor: functor.clone(),
            builtin,
        });
    }
}

fn compile_head(
    rule: &Rule,
    label: &str,
    registry: &BuiltinRegistry,
    bound: &[bool],
) -> Result<Vec<HeadAction>> {
    let check_bound = |vars: &mut dyn Iterator<Item = Var>| -> Result<()> {
        for var in vars {
            if !bound.get(var.index()).copied().unwrap_or(false) {
                return Err(Error::unbound_variable(
                    label,
                    format!("?{}", rule.var_name(var)),
                ));
            }
        }
        Ok(())
    };

    let mut head = Vec::with_capacity(rule.head.len());
    for clause in &rule.head {
        match clause {
            ClauseEntry::Triple(pattern) => {
                if has_wildcard(pattern) {
                    return Err(Error::invalid_rule(label, "wildcard in rule head"));
                }
                check_bound(&mut pattern.variables())?;
                head.push(HeadAction::Assert(pattern.clone()));
            }
            ClauseEntry::Functor(functor) => {
                let builtin = resolve(label, functor, registry)?;
                if !builtin.in_head() {
                    return Err(Error::invalid_rule(
                        label,
                        format!("builtin {} cannot be used in a rule head", functor.name),
                    ));
                }
                check_bound(&mut functor.variables())?;
                head.push(HeadAction::Invoke {
                    functor: functor.clone(),
                    builtin,
                });
            }
            ClauseEntry::Rule(_) => {
                return Err(Error::invalid_rule(label, "nested rule in rule head"));
            }
        }
    }
    Ok(head)
}

fn has_wildcard(pattern: &TriplePattern) -> bool {
    let node = |n: &PatternNode| match n {
        PatternNode::Term(term) => matches!(term, Term::Wildcard),
        PatternNode::Functor(functor) => functor.args.iter().any(|a| matches!(a, Term::Wildcard)),
    };
    node(&pattern.subject) || matches!(pattern.predicate, Term::Wildcard) || node(&pattern.object)
}

/// Checks an axiom and returns the statements it asserts.
///
/// Every head clause must be a ground triple pattern with a non-literal
/// subject and a resource predicate. Functor placeholders with ground
/// arguments are allowed in subject or object position and become
/// structured literals.
///
/// # Errors
/// Returns `InvalidRule` for any other head shape.
pub fn validate_axiom(rule: &Rule) -> Result<Vec<Triple>> {
    let label = rule.label();
    if rule.head.is_empty() {
        return Err(Error::invalid_rule(&label, "axiom has an empty head"));
    }
    rule.head
        .iter()
        .map(|clause| match clause {
            ClauseEntry::Triple(pattern) => {
                let triple = pattern.ground().ok_or_else(|| {
                    Error::invalid_rule(&label, "axiom head must be a ground triple")
                })?;
                if triple.subject.is_literal() {
                    return Err(Error::invalid_rule(&label, "axiom subject is a literal"));
                }
                if !triple.predicate.is_resource() {
                    return Err(Error::invalid_rule(&label, "axiom predicate is not a resource"));
                }
                Ok(triple)
            }
            ClauseEntry::Functor(functor) => Err(Error::invalid_rule(
                &label,
                format!("functor {} in axiom head", functor.name),
            )),
            ClauseEntry::Rule(_) => Err(Error::invalid_rule(&label, "nested rule in axiom head")),
        })
        .collect()
}
