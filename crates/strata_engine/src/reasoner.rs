//! The fixpoint driver.
//!
//! [`Reasoner::apply_axioms`] asserts the unconditional rules once;
//! [`Reasoner::apply_rules`] then runs rounds until one derives nothing.
//! Each round writes to a fresh stratum graph named `<base>#stratum-<n>`;
//! a round that derives nothing has its stratum removed and ends the loop.

use strata_foundation::{Error, GraphId, GraphName, Result, SemanticLimit, Triple};
use strata_language::{ClauseEntry, PatternNode, Rule, RuleSet, Term, TriplePattern};
use strata_storage::{GraphStore, Lookup};

use crate::builtin::BuiltinRegistry;
use crate::config::ReasonerConfig;
use crate::context::{Delta, RuleContext};
use crate::diagnostics::{Diagnostics, ReasonerEvent, ReasonerStats, TraceSink};
use crate::matcher::{RuleMatcher, Sinks};
use crate::plan::{RulePlan, validate_axiom};
use crate::provenance::{DerivationRecord, ProvenanceTracker};

/// A reasoning session: configuration, builtins, diagnostics and
/// provenance. The store is passed to each call.
#[derive(Debug)]
pub struct Reasoner {
    config: ReasonerConfig,
    registry: BuiltinRegistry,
    diagnostics: Diagnostics,
    provenance: ProvenanceTracker,
    output: Vec<String>,
}

impl Default for Reasoner {
    fn default() -> Self {
        Self::new()
    }
}

impl Reasoner {
    /// Creates a reasoner with the default configuration and the standard
    /// builtins.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ReasonerConfig::default())
    }

    /// Creates a reasoner with the given configuration.
    #[must_use]
    pub fn with_config(config: ReasonerConfig) -> Self {
        let provenance = ProvenanceTracker::with_verbosity(config.provenance);
        Self {
            config,
            registry: BuiltinRegistry::standard(),
            diagnostics: Diagnostics::new(),
            provenance,
            output: Vec::new(),
        }
    }

    /// Replaces the builtin registry.
    #[must_use]
    pub fn with_registry(mut self, registry: BuiltinRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replaces the diagnostics handle.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Installs a trace sink.
    #[must_use]
    pub fn with_trace_sink(mut self, sink: Box<dyn TraceSink>) -> Self {
        self.diagnostics.set_sink(sink);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    /// Replaces the configuration. Provenance verbosity takes effect
    /// immediately.
    pub fn set_config(&mut self, config: ReasonerConfig) {
        self.provenance.set_verbosity(config.provenance);
        self.config = config;
    }

    /// Returns the builtin registry.
    #[must_use]
    pub fn registry(&self) -> &BuiltinRegistry {
        &self.registry
    }

    /// Returns the builtin registry for adding builtins.
    pub fn registry_mut(&mut self) -> &mut BuiltinRegistry {
        &mut self.registry
    }

    /// Returns the accumulated statistics.
    #[must_use]
    pub fn stats(&self) -> &ReasonerStats {
        self.diagnostics.stats()
    }

    /// Returns the diagnostics handle.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Returns the diagnostics handle for update.
    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Returns the provenance records.
    #[must_use]
    pub fn provenance(&self) -> &ProvenanceTracker {
        &self.provenance
    }

    /// Takes the lines written by `print` since the last call.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    /// Asserts every axiom of the rule set into the `<base>#axioms` graph,
    /// skipping facts already present in the base graph, the axiom graph
    /// or any stratum of the base graph. Returns the number inserted.
    ///
    /// Every axiom is validated before anything is written.
    ///
    /// # Errors
    /// Returns `InvalidRule` for a malformed axiom, or a store error.
    pub fn apply_axioms<S: GraphStore + ?Sized>(
        &mut self,
        store: &mut S,
        base: GraphId,
        rules: &RuleSet,
    ) -> Result<usize> {
        let mut asserted: Vec<(Triple, String)> = Vec::new();
        for rule in rules.axioms() {
            let label = rule.label();
            for triple in validate_axiom(rule)? {
                asserted.push((triple, label.clone()));
            }
        }

        let base_name = store.graph_name(base).ok_or_else(|| Error::unknown_graph(base))?;
        let known = known_graphs(store, base, base, &base_name);

        let mut inserts: Vec<Triple> = Vec::new();
        let mut labels = Vec::new();
        for (triple, label) in asserted {
            if inserts.contains(&triple) || store.contains(&triple, &known)? {
                self.diagnostics
                    .emit(|| ReasonerEvent::AxiomPresent { fact: triple });
                continue;
            }
            inserts.push(triple);
            labels.push(label);
        }
        if inserts.is_empty() {
            return Ok(0);
        }

        let graph = store.create_graph(&base_name.axioms())?;
        let written = store
            .add_base(graph, &inserts)
            .and_then(|()| store.commit());
        if let Err(err) = written {
            store.rollback();
            return Err(err.with_frame("axioms"));
        }

        for (triple, label) in inserts.iter().zip(labels) {
            self.provenance
                .record(triple.clone(), DerivationRecord::new(label, 0));
            self.diagnostics.emit(|| ReasonerEvent::AxiomAsserted {
                fact: triple.clone(),
            });
        }
        self.diagnostics.stats_mut().axioms_asserted += inserts.len() as u64;
        Ok(inserts.len())
    }

    /// Runs the rule set to a fixpoint and returns the strata created, in
    /// creation order.
    ///
    /// Facts visible to rules are those in `base`, `data`, the axiom graph
    /// and every existing stratum of `base`; a second call on the same
    /// graphs therefore derives nothing and returns no strata. Every rule
    /// is compiled before the first round, so malformed rules fail without
    /// writing. Rounds commit individually: if a round fails, its stratum
    /// is discarded and earlier strata are kept.
    ///
    /// # Errors
    /// Returns rule shape errors, store errors, or `LimitExceeded` when a
    /// configured cap is hit.
    pub fn apply_rules<S: GraphStore + ?Sized>(
        &mut self,
        store: &mut S,
        base: GraphId,
        data: GraphId,
        rules: &RuleSet,
    ) -> Result<Vec<GraphId>> {
        let plans = rules
            .ordinary()
            .map(|rule| RulePlan::compile(rule, &self.registry).map(|plan| (rule, plan)))
            .collect::<Result<Vec<_>>>()?;

        let base_name = store.graph_name(base).ok_or_else(|| Error::unknown_graph(base))?;
        if store.graph_name(data).is_none() {
            return Err(Error::unknown_graph(data));
        }
        let mut known = known_graphs(store, base, data, &base_name);
        let first_index = highest_stratum(store, &base_name) + 1;

        let mut created = Vec::new();
        let mut delta = Delta::All;
        let mut derived_total = 0;
        let mut round: u32 = 0;

        loop {
            round += 1;
            if let Some(limit) = self.config.max_rounds {
                if round > limit {
                    return Err(Error::limit_exceeded(SemanticLimit::MaxRounds { limit }));
                }
            }
            self.diagnostics.stats_mut().rounds += 1;

            let index = first_index.saturating_add(round - 1);
            let name = base_name.stratum(index);
            let stratum = store.create_graph(&name)?;
            self.diagnostics.emit(|| ReasonerEvent::RoundStarted {
                round,
                stratum: name.to_string(),
            });

            let mut ctx = RuleContext::new(&mut *store, known.clone(), delta.clone(), stratum, round == 1);
            let outcome = self
                .run_round(&mut ctx, &plans, round, derived_total)
                .and_then(|()| ctx.flush_pending());
            let inserted = match outcome {
                Ok(inserted) => inserted,
                Err(mut err) => {
                    store.rollback();
                    // The failed round's stratum holds nothing committed.
                    if let Err(cleanup) = store.remove_graph(stratum) {
                        err = err.with_frame(format!("removing empty {name}: {cleanup}"));
                    }
                    return Err(err.with_frame(format!("round {round}")));
                }
            };
            derived_total += inserted;
            self.diagnostics
                .emit(|| ReasonerEvent::RoundCompleted { round, inserted });

            if inserted == 0 {
                store.remove_graph(stratum)?;
                let strata = created.len();
                self.diagnostics
                    .emit(|| ReasonerEvent::Converged { rounds: round, strata });
                return Ok(created);
            }

            self.diagnostics.stats_mut().strata_created += 1;
            created.push(stratum);
            known.push(stratum);
            delta = Delta::Graphs(vec![stratum]);
        }
    }

    fn run_round<S: GraphStore + ?Sized>(
        &mut self,
        ctx: &mut RuleContext<'_, S>,
        plans: &[(&Rule, RulePlan)],
        round: u32,
        derived_before: usize,
    ) -> Result<()> {
        let mut derived_in_round = 0;
        for (rule, plan) in plans {
            if self.config.filter_rules && !is_candidate(ctx, rule)? {
                self.diagnostics.stats_mut().rules_skipped += 1;
                self.diagnostics.emit(|| ReasonerEvent::RuleSkipped {
                    round,
                    rule: plan.label.clone(),
                });
                continue;
            }

            *self
                .diagnostics
                .stats_mut()
                .rule_attempts
                .entry(plan.label.clone())
                .or_default() += 1;

            let sinks = Sinks {
                diagnostics: &mut self.diagnostics,
                provenance: &mut self.provenance,
                output: &mut self.output,
                derived_before: derived_before + derived_in_round,
                max_derivations: self.config.max_derivations,
            };
            let derived = RuleMatcher::new(plan, ctx, sinks, round)
                .run()
                .map_err(|err| err.with_frame(format!("rule {}", plan.label)))?;
            derived_in_round += derived;

            self.diagnostics.emit(|| ReasonerEvent::RuleEvaluated {
                round,
                rule: plan.label.clone(),
                derived,
            });
        }
        Ok(())
    }
}

/// Graphs visible to rules of `base`: the base and data graphs, the axiom
/// graph, and existing strata in order.
fn known_graphs<S: GraphStore + ?Sized>(
    store: &S,
    base: GraphId,
    data: GraphId,
    base_name: &GraphName,
) -> Vec<GraphId> {
    let mut known = vec![base];
    if data != base {
        known.push(data);
    }
    if let Some(axioms) = store.find_graph(&base_name.axioms()) {
        known.push(axioms);
    }
    known.extend(existing_strata(store, base_name).into_iter().map(|(_, id)| id));
    known
}

/// Strata of `base_name` already in the store, ordered by index.
fn existing_strata<S: GraphStore + ?Sized>(store: &S, base_name: &GraphName) -> Vec<(u32, GraphId)> {
    let prefix = format!("{base_name}#stratum-");
    let mut strata: Vec<_> = store
        .graphs()
        .into_iter()
        .filter_map(|(id, name)| {
            let index = name.as_str().strip_prefix(&prefix)?.parse::<u32>().ok()?;
            Some((index, id))
        })
        .collect();
    strata.sort_unstable();
    strata
}

fn highest_stratum<S: GraphStore + ?Sized>(store: &S, base_name: &GraphName) -> u32 {
    existing_strata(store, base_name)
        .last()
        .map_or(0, |(index, _)| *index)
}

/// Returns true if some body clause, taken alone, can match a new fact.
///
/// Variables and functor placeholders are treated as wildcards, so this
/// only discards rules that cannot fire. A body with no triple patterns is
/// a candidate in the first round only.
fn is_candidate<S: GraphStore + ?Sized>(ctx: &RuleContext<'_, S>, rule: &Rule) -> Result<bool> {
    let mut patterns = rule.body.iter().filter_map(ClauseEntry::as_triple).peekable();
    if patterns.peek().is_none() {
        return Ok(ctx.is_first_round());
    }
    for pattern in patterns {
        if pattern.is_trivial() || ctx.delta_has_match(&sloppy_lookup(pattern))? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn sloppy_lookup(pattern: &TriplePattern) -> Lookup {
    let constant = |node: &PatternNode| match node {
        PatternNode::Term(Term::Constant(node)) => Some(node.clone()),
        _ => None,
    };
    Lookup::new(
        constant(&pattern.subject),
        pattern.predicate.as_constant().cloned(),
        constant(&pattern.object),
    )
}

/// Applies the axioms of a rule set with a default reasoner.
///
/// # Errors
/// See [`Reasoner::apply_axioms`].
pub fn apply_axioms<S: GraphStore + ?Sized>(
    store: &mut S,
    base: GraphId,
    rules: &RuleSet,
) -> Result<usize> {
    Reasoner::new().apply_axioms(store, base, rules)
}

/// Runs a rule set to a fixpoint with a default reasoner.
///
/// # Errors
/// See [`Reasoner::apply_rules`].
pub fn apply_rules<S: GraphStore + ?Sized>(
    store: &mut S,
    base: GraphId,
    data: GraphId,
    rules: &RuleSet,
) -> Result<Vec<GraphId>> {
    Reasoner::new().apply_rules(store, base, data, rules)
}
