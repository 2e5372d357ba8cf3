//! Session state for the REPL and CLI.
//!
//! A session owns one [`MemoryStore`] with a base graph, the rules loaded
//! so far, and a [`Reasoner`] whose trace sink is a [`Tracer`] shared with
//! the session, so trace records stay inspectable after a run.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use strata_debug::{Explanation, ObservabilityConfig, Tracer, WhyQuery};
use strata_engine::{Reasoner, ReasonerConfig, ReasonerStats, RulePlan, validate_axiom};
use strata_foundation::{Error, ErrorKind, GraphId, GraphName, Result, Triple};
use strata_language::{Parser, PrefixMap, RuleSet, parse_facts_with, parse_rules_with};
use strata_storage::{GraphStore, Lookup, MemoryStore};

/// Name of the base graph a session starts with.
pub const DEFAULT_BASE_GRAPH: &str = "urn:strata:session";

/// What a file load added to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Loaded {
    /// Rules appended to the rule set.
    Rules(usize),
    /// Facts newly added to the base graph.
    Facts(usize),
}

/// Outcome of [`Session::run`].
#[derive(Clone, Debug, Default)]
pub struct RunSummary {
    /// Axiom facts inserted before the fixpoint.
    pub axioms: usize,
    /// Strata created by this run, with their sizes.
    pub strata: Vec<(GraphName, usize)>,
    /// Lines written by `print` during the run.
    pub output: Vec<String>,
}

impl RunSummary {
    /// Returns the number of facts derived by the run.
    #[must_use]
    pub fn derived(&self) -> usize {
        self.strata.iter().map(|(_, n)| n).sum()
    }
}

/// Session state for an interactive or batch run.
pub struct Session {
    /// The graph store.
    store: MemoryStore,

    /// Handle of the base graph.
    base: GraphId,

    /// Rules loaded so far, plus the prefixes in effect.
    rules: RuleSet,

    /// The reasoner; keeps statistics and provenance across runs.
    reasoner: Reasoner,

    /// Tracer shared with the reasoner's diagnostics.
    tracer: Arc<Mutex<Tracer>>,

    /// Tracing and provenance settings.
    observability: ObservabilityConfig,

    /// Directory relative file names are resolved against.
    load_path: PathBuf,
}

impl Session {
    /// Creates a session over an empty store with the default base graph.
    ///
    /// # Errors
    /// Returns an error if the base graph cannot be created.
    pub fn new() -> Result<Self> {
        Self::with_config(
            DEFAULT_BASE_GRAPH,
            ReasonerConfig::default(),
            ObservabilityConfig::default(),
        )
    }

    /// Creates a session with the given base graph name and settings.
    ///
    /// # Errors
    /// Returns an error if the base graph cannot be created.
    pub fn with_config(
        base: &str,
        reasoner: ReasonerConfig,
        observability: ObservabilityConfig,
    ) -> Result<Self> {
        let mut store = MemoryStore::new();
        let base = store.create_graph(&GraphName::new(base))?;
        let tracer = Arc::new(Mutex::new(Tracer::new(observability.tracer_config())));
        let reasoner = Self::build_reasoner(&reasoner, &observability, &tracer);

        Ok(Self {
            store,
            base,
            rules: RuleSet::default(),
            reasoner,
            tracer,
            observability,
            load_path: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        })
    }

    fn build_reasoner(
        config: &ReasonerConfig,
        observability: &ObservabilityConfig,
        tracer: &Arc<Mutex<Tracer>>,
    ) -> Reasoner {
        Reasoner::with_config(observability.apply_to(config.clone()))
            .with_trace_sink(Box::new(Arc::clone(tracer)))
    }

    /// Returns the store.
    #[must_use]
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Returns the base graph handle.
    #[must_use]
    pub fn base(&self) -> GraphId {
        self.base
    }

    /// Returns the base graph name.
    #[must_use]
    pub fn base_name(&self) -> GraphName {
        self.store
            .graph_name(self.base)
            .unwrap_or_else(|| GraphName::new(DEFAULT_BASE_GRAPH))
    }

    /// Returns the loaded rules.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Returns the prefixes in effect for parsing and display.
    #[must_use]
    pub fn prefixes(&self) -> &PrefixMap {
        &self.rules.prefixes
    }

    /// Returns the reasoner.
    #[must_use]
    pub fn reasoner(&self) -> &Reasoner {
        &self.reasoner
    }

    /// Returns the accumulated reasoner statistics.
    #[must_use]
    pub fn stats(&self) -> &ReasonerStats {
        self.reasoner.stats()
    }

    /// Returns the observability settings.
    #[must_use]
    pub fn observability(&self) -> &ObservabilityConfig {
        &self.observability
    }

    /// Replaces the reasoner configuration. Statistics and provenance are
    /// kept.
    pub fn set_reasoner_config(&mut self, config: ReasonerConfig) {
        self.reasoner
            .set_config(self.observability.apply_to(config));
    }

    /// Locks the shared tracer.
    ///
    /// # Errors
    /// Returns an error if a previous holder of the lock panicked.
    pub fn tracer(&self) -> Result<MutexGuard<'_, Tracer>> {
        self.tracer
            .lock()
            .map_err(|_| Error::new(ErrorKind::Internal("tracer lock poisoned".into())))
    }

    /// Turns tracing on or off.
    ///
    /// # Errors
    /// Returns an error if the tracer lock is poisoned.
    pub fn set_tracing(&mut self, enabled: bool) -> Result<()> {
        self.observability.tracing = enabled;
        let prefixes = self.rules.prefixes.clone();
        let mut tracer = self.tracer()?;
        if enabled {
            tracer.set_prefixes(prefixes);
            tracer.enable();
        } else {
            tracer.disable();
        }
        Ok(())
    }

    /// Gets the current load path.
    #[must_use]
    pub fn load_path(&self) -> &PathBuf {
        &self.load_path
    }

    /// Sets the load path.
    pub fn set_load_path(&mut self, path: PathBuf) {
        self.load_path = path;
    }

    /// Resolves a path relative to the load path.
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.load_path.join(p)
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Parses rule source and appends the rules to the session.
    ///
    /// Every rule is checked for shape before any is added, so a bad rule
    /// leaves the session unchanged.
    ///
    /// # Errors
    /// Returns a parse error or a rule shape error.
    pub fn load_rules(&mut self, source: &str) -> Result<usize> {
        let set = parse_rules_with(source, &self.rules.prefixes)?;
        for rule in &set.rules {
            if rule.is_axiom() {
                validate_axiom(rule)?;
            } else {
                RulePlan::compile(rule, self.reasoner.registry())?;
            }
        }
        let count = set.len();
        self.rules.extend(set);
        self.refresh_tracer_prefixes();
        Ok(count)
    }

    /// Parses ground statements and adds them to the base graph. Returns
    /// the number of statements that were not already present.
    ///
    /// # Errors
    /// Returns a parse error or a store error.
    pub fn load_facts(&mut self, source: &str) -> Result<usize> {
        let mut parser = Parser::with_prefixes(source, self.rules.prefixes.clone());
        let facts = parser.parse_facts()?;
        self.rules.prefixes.extend(parser.prefixes());
        self.refresh_tracer_prefixes();

        let before = self.store.len(self.base)?;
        self.store.insert_all(self.base, &facts)?;
        Ok(self.store.len(self.base)? - before)
    }

    /// Loads a file: `.rules` files hold rules, anything else holds facts.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or does not parse.
    pub fn load_file(&mut self, path: &str) -> Result<Loaded> {
        let resolved = self.resolve_path(path);
        let source = fs::read_to_string(&resolved).map_err(|e| {
            Error::new(ErrorKind::Io(format!(
                "failed to read {}: {e}",
                resolved.display()
            )))
        })?;

        let is_rules = resolved
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("rules"));
        let loaded = if is_rules {
            Loaded::Rules(self.load_rules(&source)?)
        } else {
            Loaded::Facts(self.load_facts(&source)?)
        };
        Ok(loaded)
    }

    fn refresh_tracer_prefixes(&mut self) {
        if let Ok(mut tracer) = self.tracer.lock() {
            tracer.set_prefixes(self.rules.prefixes.clone());
        }
    }

    // =========================================================================
    // Reasoning
    // =========================================================================

    /// Asserts the axioms of the loaded rules.
    ///
    /// # Errors
    /// Returns an error for a malformed axiom or a store failure.
    pub fn apply_axioms(&mut self) -> Result<usize> {
        self.reasoner
            .apply_axioms(&mut self.store, self.base, &self.rules)
    }

    /// Applies axioms, then runs the rules to a fixpoint.
    ///
    /// # Errors
    /// Returns the first error from either step. Strata committed before
    /// the error stay in the store.
    pub fn run(&mut self) -> Result<RunSummary> {
        let axioms = self.apply_axioms()?;
        let created = self
            .reasoner
            .apply_rules(&mut self.store, self.base, self.base, &self.rules);
        let output = self.reasoner.take_output();
        let created = created?;

        let mut strata = Vec::with_capacity(created.len());
        for id in created {
            let name = self.store.graph_name(id).ok_or_else(|| Error::unknown_graph(id))?;
            strata.push((name, self.store.len(id)?));
        }
        Ok(RunSummary {
            axioms,
            strata,
            output,
        })
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Returns every graph belonging to the session: the base graph, its
    /// axiom graph and its strata.
    #[must_use]
    pub fn graphs(&self) -> Vec<GraphId> {
        let base_name = self.base_name();
        let prefix = format!("{}#", base_name.as_str());
        self.store
            .graphs()
            .into_iter()
            .filter(|(_, name)| name == &base_name || name.as_str().starts_with(&prefix))
            .map(|(id, _)| id)
            .collect()
    }

    /// Returns the statements of the base graph.
    ///
    /// # Errors
    /// Returns a store error.
    pub fn facts(&self) -> Result<Vec<Triple>> {
        Ok(self
            .store
            .get_statements(&Lookup::any(), &[self.base])?
            .collect())
    }

    /// Returns every statement in the session's graphs.
    ///
    /// # Errors
    /// Returns a store error.
    pub fn all_facts(&self) -> Result<Vec<Triple>> {
        Ok(self
            .store
            .get_statements(&Lookup::any(), &self.graphs())?
            .collect())
    }

    /// Returns the stratum graphs in creation order, with their sizes.
    ///
    /// # Errors
    /// Returns a store error.
    pub fn strata(&self) -> Result<Vec<(GraphName, usize)>> {
        let prefix = format!("{}#stratum-", self.base_name().as_str());
        let mut strata = Vec::new();
        for (id, name) in self.store.graphs() {
            let Some(index) = name
                .as_str()
                .strip_prefix(&prefix)
                .and_then(|n| n.parse::<u32>().ok())
            else {
                continue;
            };
            strata.push((index, name, self.store.len(id)?));
        }
        strata.sort_by_key(|(index, _, _)| *index);
        Ok(strata.into_iter().map(|(_, name, len)| (name, len)).collect())
    }

    /// Finds statements matching one pattern such as `(?s ex:p *)`.
    ///
    /// Variables and `*` match anything; repeated variables are not
    /// joined.
    ///
    /// # Errors
    /// Returns a parse error if the text is not a single triple pattern.
    pub fn find(&self, pattern: &str) -> Result<Vec<Triple>> {
        let lookup = self.parse_lookup(pattern)?;
        let mut found: Vec<_> = self
            .store
            .get_statements(&lookup, &self.graphs())?
            .collect();
        found.sort();
        Ok(found)
    }

    fn parse_lookup(&self, pattern: &str) -> Result<Lookup> {
        let set = parse_rules_with(&format!("[{pattern} -> ]"), &self.rules.prefixes)?;
        let clause = set
            .rules
            .first()
            .filter(|rule| rule.body.len() == 1)
            .and_then(|rule| rule.body[0].as_triple());
        let Some(clause) = clause else {
            return Err(Error::new(ErrorKind::Internal(format!(
                "expected one triple pattern, got {pattern}"
            ))));
        };
        Ok(Lookup::new(
            clause.subject.ground(),
            clause.predicate.as_constant().cloned(),
            clause.object.ground(),
        ))
    }

    /// Explains each of the given facts down to `depth` levels, or the
    /// configured default depth.
    ///
    /// # Errors
    /// Returns a parse error if the text is not a list of ground statements.
    pub fn why(&self, facts: &str, depth: Option<usize>) -> Result<Vec<Explanation>> {
        let facts = parse_facts_with(facts, &self.rules.prefixes)?;
        let depth = depth.unwrap_or(self.observability.why_depth);
        let query = WhyQuery::new(self.reasoner.provenance());
        Ok(facts
            .iter()
            .map(|fact| query.why_depth(fact, depth))
            .collect())
    }

    /// Discards all facts, rules, statistics, provenance and trace records.
    /// The base graph name and settings are kept.
    ///
    /// # Errors
    /// Returns an error if the base graph cannot be recreated.
    pub fn reset(&mut self) -> Result<()> {
        let base_name = self.base_name();
        let mut store = MemoryStore::new();
        self.base = store.create_graph(&base_name)?;
        self.store = store;
        self.rules = RuleSet::default();

        let config = self.reasoner.config().clone();
        self.reasoner = Self::build_reasoner(&config, &self.observability, &self.tracer);
        self.tracer()?.clear();
        self.refresh_tracer_prefixes();
        Ok(())
    }
}
