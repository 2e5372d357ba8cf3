//! Trace output formatters.

use std::fmt::Write;

use strata_engine::ReasonerEvent;
use strata_foundation::Triple;
use strata_language::{PrefixMap, format_triple};

use super::record::TraceRecord;

/// Formats trace records.
pub trait TraceFormatter {
    /// Formats one record, shortening IRIs with `prefixes` when given.
    fn format(&self, record: &TraceRecord, prefixes: Option<&PrefixMap>) -> String;

    /// Formats several records, one per line.
    fn format_many(&self, records: &[&TraceRecord], prefixes: Option<&PrefixMap>) -> String {
        records
            .iter()
            .map(|r| self.format(r, prefixes))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// =============================================================================
// Human-Readable Formatter
// =============================================================================

/// Formats trace records in human-readable form.
#[derive(Clone, Debug, Default)]
pub struct HumanFormatter {
    /// Whether to include timestamps.
    pub show_timestamps: bool,
    /// Whether to include record IDs.
    pub show_ids: bool,
}

impl HumanFormatter {
    /// Creates a new human formatter with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to show timestamps.
    #[must_use]
    pub fn with_timestamps(mut self) -> Self {
        self.show_timestamps = true;
        self
    }

    /// Builder method to show record IDs.
    #[must_use]
    pub fn with_ids(mut self) -> Self {
        self.show_ids = true;
        self
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_timestamp(ns: u64) -> String {
        let us = ns / 1000;
        if us >= 1_000_000 {
            format!("{:.3}s", us as f64 / 1_000_000.0)
        } else if us >= 1000 {
            format!("{:.3}ms", us as f64 / 1000.0)
        } else {
            format!("{us}us")
        }
    }
}

impl TraceFormatter for HumanFormatter {
    fn format(&self, record: &TraceRecord, prefixes: Option<&PrefixMap>) -> String {
        let mut prefix = String::new();
        if self.show_ids {
            let _ = write!(prefix, "[{:06}] ", record.id);
        }
        let _ = write!(prefix, "R{:04} ", record.round);
        if self.show_timestamps {
            let _ = write!(prefix, "{:>10} ", Self::format_timestamp(record.timestamp_ns));
        }

        let fact = |t: &Triple| format_triple(t, prefixes);
        let event = match &record.event {
            ReasonerEvent::AxiomAsserted { fact: t } => format!("  AXIOM {}", fact(t)),
            ReasonerEvent::AxiomPresent { fact: t } => format!("  AXIOM (present) {}", fact(t)),
            ReasonerEvent::RoundStarted { round, stratum } => {
                format!("=== ROUND {round} -> {stratum} ===")
            }
            ReasonerEvent::RuleSkipped { rule, .. } => format!("  SKIP {rule}"),
            ReasonerEvent::RuleEvaluated { rule, derived, .. } => {
                format!("  RULE {rule} derived {derived}")
            }
            ReasonerEvent::FactDerived { rule, fact: t, .. } => {
                format!("    DERIVED ({rule}) {}", fact(t))
            }
            ReasonerEvent::DuplicateSuppressed { rule, fact: t, .. } => {
                format!("    DUPLICATE ({rule}) {}", fact(t))
            }
            ReasonerEvent::Printed { rule, text } => format!("    PRINT ({rule}) {text}"),
            ReasonerEvent::RoundCompleted { round, inserted } => {
                format!("=== ROUND {round} END ({inserted} inserted) ===")
            }
            ReasonerEvent::Converged { rounds, strata } => {
                format!("=== CONVERGED after {rounds} rounds, {strata} strata ===")
            }
        };
        format!("{prefix}{event}")
    }
}

// =============================================================================
// JSON Formatter
// =============================================================================

/// Formats trace records as single-line JSON objects.
#[derive(Clone, Debug, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    /// Creates a new JSON formatter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn escape(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '"' => out.push_str("\\\""),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                c if c.is_control() => {
                    let _ = write!(out, "\\u{:04x}", u32::from(c));
                }
                c => out.push(c),
            }
        }
        out
    }

    fn string(s: &str) -> String {
        format!("\"{}\"", Self::escape(s))
    }
}

impl TraceFormatter for JsonFormatter {
    fn format(&self, record: &TraceRecord, prefixes: Option<&PrefixMap>) -> String {
        let fact = |t: &Triple| Self::string(&format_triple(t, prefixes));
        let rule = |r: &str| Self::string(r);
        let data = match &record.event {
            ReasonerEvent::AxiomAsserted { fact: t } | ReasonerEvent::AxiomPresent { fact: t } => {
                format!("\"fact\":{}", fact(t))
            }
            ReasonerEvent::RoundStarted { stratum, .. } => {
                format!("\"stratum\":{}", Self::string(stratum))
            }
            ReasonerEvent::RuleSkipped { rule: r, .. } => format!("\"rule\":{}", rule(r)),
            ReasonerEvent::RuleEvaluated { rule: r, derived, .. } => {
                format!("\"rule\":{},\"derived\":{derived}", rule(r))
            }
            ReasonerEvent::FactDerived { rule: r, fact: t, .. }
            | ReasonerEvent::DuplicateSuppressed { rule: r, fact: t, .. } => {
                format!("\"rule\":{},\"fact\":{}", rule(r), fact(t))
            }
            ReasonerEvent::Printed { rule: r, text } => {
                format!("\"rule\":{},\"text\":{}", rule(r), Self::string(text))
            }
            ReasonerEvent::RoundCompleted { inserted, .. } => format!("\"inserted\":{inserted}"),
            ReasonerEvent::Converged { rounds, strata } => {
                format!("\"rounds\":{rounds},\"strata\":{strata}")
            }
        };
        format!(
            "{{\"id\":{},\"round\":{},\"ts\":{},\"type\":\"{}\",{data}}}",
            record.id,
            record.round,
            record.timestamp_ns,
            record.event_type()
        )
    }
}
