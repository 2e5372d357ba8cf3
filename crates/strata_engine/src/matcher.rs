//! Recursive backtracking join over a compiled rule body.

use strata_foundation::{Error, Result, SemanticLimit, Triple};
use strata_language::TriplePattern;
use strata_storage::{GraphStore, Lookup};

use crate::binding::BindingEnv;
use crate::builtin::Call;
use crate::context::RuleContext;
use crate::diagnostics::{Diagnostics, ReasonerEvent};
use crate::plan::{HeadAction, RulePlan, Step};
use crate::provenance::{DerivationRecord, ProvenanceTracker};

/// Shared state a rule evaluation writes into.
pub(crate) struct Sinks<'a> {
    pub diagnostics: &'a mut Diagnostics,
    pub provenance: &'a mut ProvenanceTracker,
    pub output: &'a mut Vec<String>,
    /// Facts derived earlier in the same `apply_rules` call.
    pub derived_before: usize,
    pub max_derivations: Option<usize>,
}

/// One evaluation of one rule in one round.
pub(crate) struct RuleMatcher<'a, 'c, 's, S: GraphStore + ?Sized> {
    plan: &'a RulePlan,
    ctx: &'c mut RuleContext<'s, S>,
    sinks: Sinks<'c>,
    env: BindingEnv,
    premises: Vec<Triple>,
    track_premises: bool,
    round: u32,
    derived: usize,
}

impl<'a, 'c, 's, S: GraphStore + ?Sized> RuleMatcher<'a, 'c, 's, S> {
    pub(crate) fn new(
        plan: &'a RulePlan,
        ctx: &'c mut RuleContext<'s, S>,
        sinks: Sinks<'c>,
        round: u32,
    ) -> Self {
        let track_premises = sinks.provenance.verbosity().keeps_premises();
        Self {
            plan,
            ctx,
            sinks,
            env: BindingEnv::new(plan.var_count),
            premises: Vec::new(),
            track_premises,
            round,
            derived: 0,
        }
    }

    /// Runs the join and returns the number of facts staged.
    pub(crate) fn run(mut self) -> Result<usize> {
        self.match_from(0, false)?;
        Ok(self.derived)
    }

    fn match_from(&mut self, step: usize, matched_new: bool) -> Result<()> {
        let plan = self.plan;
        let Some(current) = plan.steps.get(step) else {
            return self.fire(matched_new);
        };
        match current {
            Step::Match(pattern) => {
                let lookup = self.lookup_for(pattern);
                let candidates = self.ctx.find(&lookup)?;
                for (triple, is_new) in candidates {
                    self.env.push();
                    let result = if self.env.match_triple(pattern, &triple) {
                        if self.track_premises {
                            self.premises.push(triple);
                        }
                        let result = self.match_from(step + 1, matched_new || is_new);
                        if self.track_premises {
                            self.premises.pop();
                        }
                        result
                    } else {
                        Ok(())
                    };
                    self.env.unwind();
                    result?;
                }
                Ok(())
            }
            Step::Call { functor, builtin } => {
                self.env.push();
                let printed = self.sinks.output.len();
                let passed = {
                    let mut call =
                        Call::new(&functor.args, &mut self.env, &*self.ctx, self.sinks.output);
                    builtin.evaluate(&mut call)
                };
                self.report_printed(printed);
                let result = match passed {
                    Ok(true) => self.match_from(step + 1, matched_new),
                    Ok(false) => Ok(()),
                    Err(err) => Err(err),
                };
                self.env.unwind();
                result
            }
        }
    }

    /// Builds the store lookup for a pattern under the current bindings.
    /// Unbound variables, wildcards and partially bound functors are
    /// wildcards.
    fn lookup_for(&self, pattern: &TriplePattern) -> Lookup {
        Lookup::new(
            self.env.pattern_value(&pattern.subject),
            self.env.value(&pattern.predicate),
            self.env.pattern_value(&pattern.object),
        )
    }

    fn fire(&mut self, matched_new: bool) -> Result<()> {
        let plan = self.plan;
        let eligible = matched_new || (plan.pattern_count == 0 && self.ctx.is_first_round());
        if !eligible {
            return Ok(());
        }
        for action in &plan.head {
            match action {
                HeadAction::Assert(pattern) => {
                    let triple = self.env.instantiate(pattern)?;
                    self.derive(triple)?;
                }
                HeadAction::Invoke { functor, builtin } => {
                    let printed = self.sinks.output.len();
                    {
                        let mut call =
                            Call::new(&functor.args, &mut self.env, &*self.ctx, self.sinks.output);
                        builtin.evaluate(&mut call)?;
                    }
                    self.report_printed(printed);
                }
            }
        }
        Ok(())
    }

    fn derive(&mut self, triple: Triple) -> Result<()> {
        let stats = self.sinks.diagnostics.stats_mut();
        if !triple.is_valid_statement() {
            stats.invalid_heads_dropped += 1;
            return Ok(());
        }
        if self.ctx.contains(&triple)? {
            stats.duplicates_suppressed += 1;
            let (round, rule) = (self.round, &self.plan.label);
            self.sinks
                .diagnostics
                .emit(|| ReasonerEvent::DuplicateSuppressed {
                    round,
                    rule: rule.clone(),
                    fact: triple,
                });
            return Ok(());
        }

        self.ctx.add(triple.clone());
        self.derived += 1;
        stats.facts_derived += 1;

        if let Some(limit) = self.sinks.max_derivations {
            if self.sinks.derived_before + self.derived > limit {
                return Err(Error::limit_exceeded(SemanticLimit::MaxDerivations {
                    limit,
                    context: Some(format!("in rule {}", self.plan.label)),
                }));
            }
        }

        if self.sinks.provenance.verbosity().is_enabled() {
            let mut premises = self.premises.clone();
            premises.reverse();
            let bindings = self
                .env
                .snapshot()
                .into_iter()
                .map(|(var, node)| (self.plan.var_name(var), node))
                .collect();
            let record = DerivationRecord::new(self.plan.label.clone(), self.round)
                .with_premises(premises)
                .with_bindings(bindings);
            self.sinks.provenance.record(triple.clone(), record);
        }

        let (round, rule) = (self.round, &self.plan.label);
        self.sinks.diagnostics.emit(|| ReasonerEvent::FactDerived {
            round,
            rule: rule.clone(),
            fact: triple,
        });
        Ok(())
    }

    fn report_printed(&mut self, from: usize) {
        let rule = &self.plan.label;
        for text in &self.sinks.output[from..] {
            self.sinks.diagnostics.emit(|| ReasonerEvent::Printed {
                rule: rule.clone(),
                text: text.clone(),
            });
        }
    }
}
