//! The main REPL implementation.

use std::fmt::Write as _;
use std::io::{self, Write};

use strata_foundation::{Error, ErrorKind, Result, Triple};
use strata_language::{RulePrinter, format_triple};

use crate::command::{Command, HELP, TraceCommand};
use crate::editor::{LineEditor, ReadResult, RustylineEditor, bracket_depth};
use crate::session::{Loaded, RunSummary, Session};

/// What evaluating one input produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Text to show the user.
    Text(String),
    /// Nothing to show.
    Nothing,
    /// The user asked to leave.
    Quit,
}

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// Session state (store, rules, reasoner).
    session: Session,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,

    /// Continuation prompt (for multi-line input).
    continuation_prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor or the session fails to initialize.
    pub fn new() -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor, Session::new()?))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL with the given editor and session.
    pub fn with_editor(editor: E, session: Session) -> Self {
        Self {
            editor,
            session,
            show_banner: true,
            prompt: "strata> ".to_string(),
            continuation_prompt: "   ...> ".to_string(),
        }
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Returns a reference to the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns a mutable reference to the session.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Runs the REPL loop.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails fatally.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }
        self.refresh_keywords();

        loop {
            match self.read_eval_print() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => print_error(&e),
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Executes one read-eval-print iteration.
    ///
    /// Returns `Ok(true)` to continue, `Ok(false)` to exit.
    fn read_eval_print(&mut self) -> Result<bool> {
        let Some(input) = self.read_input()? else {
            return Ok(false);
        };
        if input.trim().is_empty() {
            return Ok(true);
        }
        self.editor.add_history(&input);

        match self.eval(&input) {
            Ok(Reply::Text(text)) => println!("{text}"),
            Ok(Reply::Nothing) => {}
            Ok(Reply::Quit) => return Ok(false),
            Err(e) => print_error(&e),
        }
        self.refresh_keywords();
        Ok(true)
    }

    /// Reads a potentially multi-line input.
    fn read_input(&mut self) -> Result<Option<String>> {
        let mut input = String::new();
        let mut first_line = true;

        loop {
            let prompt = if first_line {
                &self.prompt
            } else {
                &self.continuation_prompt
            };

            match self.editor.read_line(prompt)? {
                ReadResult::Line(line) => {
                    if !first_line {
                        input.push('\n');
                    }
                    input.push_str(&line);
                    if bracket_depth(&input) <= 0 {
                        return Ok(Some(input));
                    }
                    first_line = false;
                }
                ReadResult::Interrupted => {
                    if !first_line {
                        println!("\nInput cancelled.");
                    }
                    return Ok(Some(String::new()));
                }
                ReadResult::Eof => {
                    if first_line {
                        return Ok(None);
                    }
                    return Err(Error::new(ErrorKind::Internal(
                        "unexpected EOF in multi-line input".to_string(),
                    )));
                }
            }
        }
    }

    fn refresh_keywords(&mut self) {
        let mut keywords: Vec<String> = self
            .session
            .reasoner()
            .registry()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect();
        keywords.extend(self.session.prefixes().iter().map(|(p, _)| format!("{p}:")));
        self.editor.set_keywords(keywords);
    }

    /// Evaluates one input: a `:command`, or rule source.
    ///
    /// # Errors
    ///
    /// Returns an error if the command or the rules fail.
    pub fn eval(&mut self, input: &str) -> Result<Reply> {
        match Command::parse(input)? {
            Some(command) => self.execute(command),
            None => {
                let count = self.session.load_rules(input)?;
                Ok(Reply::Text(format!("{count} rule(s) added")))
            }
        }
    }

    /// Executes a parsed command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        let text = match command {
            Command::Quit => return Ok(Reply::Quit),
            Command::Help => HELP.to_string(),
            Command::Rules => self.show_rules(),
            Command::Facts { all } => {
                let facts = if all {
                    self.session.all_facts()?
                } else {
                    self.session.facts()?
                };
                self.show_triples(&facts)
            }
            Command::Assert(source) => {
                let added = self.session.load_facts(&source)?;
                format!("{added} fact(s) added")
            }
            Command::Load(path) => match self.session.load_file(&path)? {
                Loaded::Rules(n) => format!("loaded {n} rule(s) from {path}"),
                Loaded::Facts(n) => format!("loaded {n} fact(s) from {path}"),
            },
            Command::Axioms => {
                let asserted = self.session.apply_axioms()?;
                format!("{asserted} axiom fact(s) asserted")
            }
            Command::Run => {
                let summary = self.session.run()?;
                format_summary(&summary)
            }
            Command::Find(pattern) => {
                let found = self.session.find(&pattern)?;
                self.show_triples(&found)
            }
            Command::Strata => {
                let strata = self.session.strata()?;
                if strata.is_empty() {
                    "no strata".to_string()
                } else {
                    strata
                        .iter()
                        .map(|(name, len)| format!("{name}  {len}"))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            Command::Stats => self.session.stats().to_string(),
            Command::Trace(trace) => self.trace(trace)?,
            Command::Why { facts, depth } => {
                let prefixes = self.session.prefixes();
                self.session
                    .why(&facts, depth)?
                    .iter()
                    .map(|e| e.render(Some(prefixes)))
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            }
            Command::Reset => {
                self.session.reset()?;
                "session reset".to_string()
            }
        };
        Ok(Reply::Text(text))
    }

    fn trace(&mut self, command: TraceCommand) -> Result<String> {
        match command {
            TraceCommand::On => {
                self.session.set_tracing(true)?;
                return Ok("tracing on".to_string());
            }
            TraceCommand::Off => {
                self.session.set_tracing(false)?;
                return Ok("tracing off".to_string());
            }
            _ => {}
        }

        let mut tracer = self.session.tracer()?;
        let text = match command {
            TraceCommand::Status => {
                let stats = tracer.stats();
                let mut text = format!(
                    "tracing {}, {} of {} records",
                    if tracer.is_enabled() { "on" } else { "off" },
                    stats.record_count,
                    stats.max_size
                );
                for (kind, count) in &stats.event_counts {
                    let _ = write!(text, "\n  {kind}: {count}");
                }
                text
            }
            TraceCommand::Last(n) => tracer.format_records(&tracer.buffer().recent(n)),
            TraceCommand::Round(round) => {
                tracer.format_records(&tracer.buffer().records_for_round(round))
            }
            TraceCommand::Rule(rule) => tracer.format_records(&tracer.buffer().by_rule(&rule)),
            TraceCommand::Json(json) => {
                tracer.set_json_format(json);
                format!("trace format: {}", if json { "json" } else { "human" })
            }
            TraceCommand::Clear => {
                tracer.clear();
                "trace cleared".to_string()
            }
            TraceCommand::On | TraceCommand::Off => String::new(),
        };
        Ok(text)
    }

    fn show_rules(&self) -> String {
        let rules = self.session.rules();
        if rules.is_empty() {
            return "no rules".to_string();
        }
        rules
            .rules
            .iter()
            .map(|rule| {
                RulePrinter::new(rule)
                    .with_prefixes(&rules.prefixes)
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn show_triples(&self, triples: &[Triple]) -> String {
        let prefixes = self.session.prefixes();
        let mut text: String = triples
            .iter()
            .map(|t| format!("{}\n", format_triple(t, Some(prefixes))))
            .collect();
        let _ = write!(text, "{} statement(s)", triples.len());
        text
    }

    /// Prints the welcome banner.
    #[allow(clippy::unused_self)]
    fn print_banner(&self) {
        println!("\x1b[1;36mstrata\x1b[0m {}", env!("CARGO_PKG_VERSION"));
        println!("Type rules to add them, :help for commands, Ctrl+D to exit.\n");
        let _ = io::stdout().flush();
    }
}

/// Formats the outcome of a run.
#[must_use]
pub fn format_summary(summary: &RunSummary) -> String {
    let mut text = String::new();
    for line in &summary.output {
        let _ = writeln!(text, "{line}");
    }
    if summary.axioms > 0 {
        let _ = writeln!(text, "{} axiom fact(s) asserted", summary.axioms);
    }
    for (name, len) in &summary.strata {
        let _ = writeln!(text, "{name}: {len} fact(s)");
    }
    let _ = write!(
        text,
        "{} fact(s) derived in {} strat{}",
        summary.derived(),
        summary.strata.len(),
        if summary.strata.len() == 1 { "um" } else { "a" }
    );
    text
}

/// Prints an error to stderr.
fn print_error(error: &Error) {
    eprintln!("\x1b[31mError: {error}\x1b[0m");
    if let Some(context) = &error.context {
        eprint!("{context}");
    }
}
