//! Input side of the REPL.
//!
//! The REPL reads through a [`LineEditor`]. [`RustylineEditor`] backs it with
//! a terminal; tests drive the REPL with scripted editors.

use std::borrow::Cow;

use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Completer, Config, Context, Editor, Helper, Hinter, Validator as RLValidator};
use strata_foundation::{Error, ErrorKind, Result};

use crate::command::COMMAND_NAMES;
use crate::highlight::StrataHighlighter;

/// Outcome of one read.
#[derive(Debug)]
pub enum ReadResult {
    /// The user entered text, possibly spanning several physical lines.
    Line(String),
    /// Ctrl+C: abandon the current input.
    Interrupted,
    /// Ctrl+D or end of input.
    Eof,
}

/// Source of REPL input.
pub trait LineEditor {
    /// Shows `prompt` and waits for input.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying terminal fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Remembers an entry for history navigation.
    fn add_history(&mut self, line: &str);

    /// Set the words offered for completion besides the commands.
    fn set_keywords(&mut self, keywords: Vec<String>);
}

/// Bundles the rustyline hooks strata installs.
#[derive(Helper, Completer, Hinter, RLValidator)]
struct StrataHelper {
    #[rustyline(Completer)]
    completer: StrataCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
    #[rustyline(Validator)]
    validator: BracketValidator,
    highlighter: StrataHighlighter,
}

impl Highlighter for StrataHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.highlighter.highlight(line, pos)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;32m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{hint}\x1b[0m"))
    }
}

/// Completes commands, builtin names and prefixes; file paths after `:load`.
struct StrataCompleter {
    file_completer: FilenameCompleter,
    keywords: Vec<String>,
}

impl StrataCompleter {
    fn new() -> Self {
        Self {
            file_completer: FilenameCompleter::new(),
            keywords: Vec::new(),
        }
    }
}

impl Completer for StrataCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if line.trim_start().starts_with(":load ") {
            return self.file_completer.complete(line, pos, ctx);
        }

        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || "()[]".contains(c))
            .map_or(0, |i| i + 1);
        let prefix = &line[start..pos];

        let candidates = COMMAND_NAMES
            .iter()
            .map(|c| (*c).to_string())
            .chain(self.keywords.iter().cloned())
            .filter(|candidate| candidate.starts_with(prefix))
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();

        Ok((start, candidates))
    }
}

/// Keeps reading while a rule has unclosed brackets.
#[derive(Default)]
struct BracketValidator;

impl Validator for BracketValidator {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        if bracket_depth(ctx.input()) > 0 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

/// Returns how many `(`/`[` are still open, ignoring strings, IRIs and
/// comments. Negative if there are more closers than openers.
pub(crate) fn bracket_depth(input: &str) -> i32 {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut in_iri = false;
    let mut in_comment = false;
    let mut escape_next = false;

    for c in input.chars() {
        if in_comment {
            in_comment = c != '\n';
            continue;
        }
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' if !in_iri => in_string = !in_string,
            '<' if !in_string => in_iri = true,
            '>' if in_iri => in_iri = false,
            '#' if !in_string && !in_iri => in_comment = true,
            '(' | '[' if !in_string && !in_iri => depth += 1,
            ')' | ']' if !in_string && !in_iri => depth -= 1,
            _ => {}
        }
    }

    if in_string { depth.max(1) } else { depth }
}

/// Terminal [`LineEditor`].
pub struct RustylineEditor {
    editor: Editor<StrataHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Opens the terminal editor with strata highlighting and completion.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be set up.
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .auto_add_history(false)
            .max_history_size(1000)
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?
            .build();

        let helper = StrataHelper {
            completer: StrataCompleter::new(),
            hinter: HistoryHinter::new(),
            validator: BracketValidator,
            highlighter: StrataHighlighter::new(),
        };

        let mut editor = Editor::with_config(config)
            .map_err(|e| Error::new(ErrorKind::Internal(e.to_string())))?;
        editor.set_helper(Some(helper));

        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::new(ErrorKind::Io(e.to_string()))),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }

    fn set_keywords(&mut self, keywords: Vec<String>) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.completer.keywords = keywords;
        }
    }
}
