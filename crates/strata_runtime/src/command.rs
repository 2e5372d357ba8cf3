//! The `:command` language of the REPL.
//!
//! Lines starting with `:` are commands; anything else is rule source.

use strata_foundation::{Error, ErrorKind, Result};

/// A trace subcommand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TraceCommand {
    /// Show buffer statistics.
    Status,
    /// Enable tracing.
    On,
    /// Disable tracing.
    Off,
    /// Show the most recent records.
    Last(usize),
    /// Show the records of one round.
    Round(u32),
    /// Show the records mentioning one rule.
    Rule(String),
    /// Switch between JSON and human output.
    Json(bool),
    /// Drop all records.
    Clear,
}

/// A parsed REPL command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `:rules`
    Rules,
    /// `:facts` (base graph) or `:facts all` (every session graph).
    Facts {
        /// Include axioms and strata.
        all: bool,
    },
    /// `:assert (s p o) ...`
    Assert(String),
    /// `:load path`
    Load(String),
    /// `:axioms`
    Axioms,
    /// `:run`
    Run,
    /// `:find (s p o)`
    Find(String),
    /// `:strata`
    Strata,
    /// `:stats`
    Stats,
    /// `:trace ...`
    Trace(TraceCommand),
    /// `:why (s p o) [depth]`
    Why {
        /// Statements to explain.
        facts: String,
        /// Explanation depth, if given.
        depth: Option<usize>,
    },
    /// `:reset`
    Reset,
    /// `:help`
    Help,
    /// `:quit`
    Quit,
}

/// Every command name, for completion.
pub const COMMAND_NAMES: &[&str] = &[
    ":rules", ":facts", ":assert", ":load", ":axioms", ":run", ":find", ":strata", ":stats",
    ":trace", ":why", ":reset", ":help", ":quit",
];

fn usage(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::Internal(message.into()))
}

impl Command {
    /// Parses a line. Returns `Ok(None)` if the line is not a command.
    ///
    /// # Errors
    /// Returns an error for an unknown command or bad arguments.
    pub fn parse(input: &str) -> Result<Option<Self>> {
        let input = input.trim();
        let Some(rest) = input.strip_prefix(':') else {
            return Ok(None);
        };
        let (name, args) = rest
            .split_once(char::is_whitespace)
            .map_or((rest, ""), |(n, a)| (n, a.trim()));

        let command = match name {
            "rules" => Self::Rules,
            "facts" => match args {
                "" => Self::Facts { all: false },
                "all" => Self::Facts { all: true },
                other => return Err(usage(format!("usage: :facts [all], got {other}"))),
            },
            "assert" => Self::Assert(required(args, ":assert (s p o) ...")?),
            "load" => Self::Load(required(args, ":load <path>")?),
            "axioms" => Self::Axioms,
            "run" => Self::Run,
            "find" => Self::Find(required(args, ":find (s p o)")?),
            "strata" => Self::Strata,
            "stats" => Self::Stats,
            "trace" => Self::Trace(parse_trace(args)?),
            "why" => parse_why(args)?,
            "reset" => Self::Reset,
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(usage(format!("unknown command :{other}; try :help"))),
        };
        Ok(Some(command))
    }
}

fn required(args: &str, form: &str) -> Result<String> {
    if args.is_empty() {
        Err(usage(format!("usage: {form}")))
    } else {
        Ok(args.to_string())
    }
}

fn parse_trace(args: &str) -> Result<TraceCommand> {
    let words: Vec<_> = args.split_whitespace().collect();
    let number = |word: Option<&&str>| {
        word.and_then(|w| w.parse::<usize>().ok())
            .ok_or_else(|| usage("expected a number"))
    };
    Ok(match words.first().copied() {
        None | Some("status") => TraceCommand::Status,
        Some("on") => TraceCommand::On,
        Some("off") => TraceCommand::Off,
        Some("clear") => TraceCommand::Clear,
        Some("json") => TraceCommand::Json(true),
        Some("human") => TraceCommand::Json(false),
        Some("last") => TraceCommand::Last(words.get(1).map_or(Ok(20), |w| number(Some(w)))?),
        Some("round") => {
            let n = number(words.get(1))?;
            TraceCommand::Round(u32::try_from(n).map_err(|_| usage("round out of range"))?)
        }
        Some("rule") => TraceCommand::Rule(
            words
                .get(1)
                .map(ToString::to_string)
                .ok_or_else(|| usage("usage: :trace rule <name>"))?,
        ),
        Some(other) => return Err(usage(format!("unknown trace option {other}"))),
    })
}

/// `:why` takes statements, optionally followed by a depth after the last
/// closing parenthesis.
fn parse_why(args: &str) -> Result<Command> {
    let facts = required(args, ":why (s p o) [depth]")?;
    if let Some(close) = facts.rfind(')') {
        let tail = facts[close + 1..].trim();
        if !tail.is_empty() {
            let depth = tail
                .parse()
                .map_err(|_| usage(format!("expected a depth, got {tail}")))?;
            return Ok(Command::Why {
                facts: facts[..=close].to_string(),
                depth: Some(depth),
            });
        }
    }
    Ok(Command::Why { facts, depth: None })
}

/// Help text for `:help`.
pub const HELP: &str = "\
Commands:
  :rules               list loaded rules
  :facts [all]         list base facts (all: include axioms and strata)
  :assert (s p o) ...  add facts to the base graph
  :load <path>         load a .rules file or a facts file
  :axioms              assert the axioms of the loaded rules
  :run                 assert axioms and run the rules to a fixpoint
  :find (s p o)        find statements; ?vars and * match anything
  :strata              list stratum graphs and their sizes
  :stats               show reasoner statistics
  :trace [on|off|last N|round N|rule R|json|human|clear]
  :why (s p o) [depth] explain how a fact was derived
  :reset               discard facts, rules and history
  :help                show this help
  :quit                exit

Anything else is read as rule source, e.g.
  [r: (?x rdf:type ex:Employee) -> (?x rdf:type ex:Person)]";
