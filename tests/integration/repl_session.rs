//! Scripted REPL sessions over the runtime layer

use std::collections::VecDeque;

use strata_foundation::{Node, Result};
use strata_runtime::{LineEditor, ReadResult, Repl, Reply, Session};

/// Feeds a fixed script to the REPL, then reports end of input.
#[derive(Default)]
struct Script {
    lines: VecDeque<String>,
    prompts: Vec<String>,
    history: Vec<String>,
}

impl Script {
    fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| (*l).to_string()).collect(),
            ..Self::default()
        }
    }
}

impl LineEditor for Script {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        self.prompts.push(prompt.to_string());
        Ok(self
            .lines
            .pop_front()
            .map_or(ReadResult::Eof, ReadResult::Line))
    }

    fn add_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }

    fn set_keywords(&mut self, _keywords: Vec<String>) {}
}

fn ex(local: &str) -> Node {
    Node::resource(format!("http://example.org/{local}"))
}

#[test]
fn scripted_session_runs_to_a_fixpoint() {
    let script = Script::new(&[
        "@prefix ex: <http://example.org/> .",
        "[trans: (?x ex:lt ?y)",
        "        (?y ex:lt ?z)",
        "   -> (?x ex:lt ?z)]",
        ":assert (ex:a ex:lt ex:b) (ex:b ex:lt ex:c) (ex:c ex:lt ex:d)",
        ":run",
        ":quit",
        ":run",
    ]);
    let mut repl = Repl::with_editor(script, Session::new().unwrap()).without_banner();
    repl.run().unwrap();

    let session = repl.session();
    assert_eq!(session.rules().len(), 1);
    let strata = session.strata().unwrap();
    let sizes: Vec<_> = strata.iter().map(|(_, n)| *n).collect();
    assert_eq!(sizes, vec![2, 1]);
    assert!(session
        .find("(ex:a ex:lt ex:d)")
        .unwrap()
        .iter()
        .any(|t| t.object == ex("d")));
    // The second :run after :quit was never read.
    assert_eq!(session.stats().rounds, 3);
}

#[test]
fn multi_line_rules_enter_history_as_one_entry() {
    let script = Script::new(&["[r: (?x rdf:type ?c)", " -> (?c rdf:type rdfs:Class)]"]);
    let mut repl = Repl::with_editor(script, Session::new().unwrap()).without_banner();
    repl.run().unwrap();
    assert_eq!(repl.session().rules().len(), 1);
}

#[test]
fn errors_do_not_end_the_session() {
    let script = Script::new(&[
        ":frobnicate",
        "[broken: (?x ex:p",
        ")]",
        "@prefix ex: <http://example.org/> .",
        ":assert (ex:a ex:p ex:b)",
    ]);
    let mut repl = Repl::with_editor(script, Session::new().unwrap()).without_banner();
    repl.run().unwrap();
    assert_eq!(repl.session().facts().unwrap().len(), 1);
}

#[test]
fn why_and_strata_through_eval() {
    let mut repl = Repl::with_editor(Script::default(), Session::new().unwrap());
    repl.eval(
        "@prefix ex: <http://example.org/> .
         [sub: (?x rdf:type ?c) (?c rdfs:subClassOf ?d) -> (?x rdf:type ?d)]
         -> (ex:Cat rdfs:subClassOf ex:Animal) .",
    )
    .unwrap();
    repl.eval(":assert (ex:tom rdf:type ex:Cat)").unwrap();

    let Reply::Text(summary) = repl.eval(":run").unwrap() else {
        panic!("expected text");
    };
    assert!(summary.ends_with("1 fact(s) derived in 1 stratum"));

    let Reply::Text(why) = repl.eval(":why (ex:tom rdf:type ex:Animal) 2").unwrap() else {
        panic!("expected text");
    };
    let lines: Vec<_> = why.lines().collect();
    assert_eq!(lines[0], "(ex:tom rdf:type ex:Animal)  [sub, round 1]");
    assert_eq!(lines[1], "  (ex:tom rdf:type ex:Cat)  [given]");
    assert!(lines[2].contains("[axiom"));

    let Reply::Text(strata) = repl.eval(":strata").unwrap() else {
        panic!("expected text");
    };
    assert_eq!(strata, "urn:strata:session#stratum-1  1");
}
