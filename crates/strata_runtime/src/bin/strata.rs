//! strata CLI entry point.

use std::env;
use std::process::ExitCode;

use strata_debug::ObservabilityConfig;
use strata_engine::ReasonerConfig;
use strata_language::format_triple;
use strata_runtime::repl::format_summary;
use strata_runtime::{DEFAULT_BASE_GRAPH, Loaded, Repl, RustylineEditor, Session};
use strata_storage::{GraphStore, Lookup};

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    files: Vec<String>,
    batch_mode: bool,
    show_help: bool,
    show_version: bool,
    base: Option<String>,
    // Debug flags
    trace: bool,
    json: bool,
    max_rounds: Option<u32>,
    max_derivations: Option<usize>,
    dump: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn value<T: std::str::FromStr>(
    args: &[String],
    i: &mut usize,
    flag: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    *i += 1;
    let raw = args
        .get(*i)
        .ok_or_else(|| format!("{flag} requires a value"))?;
    raw.parse()
        .map_err(|_| format!("invalid {flag} value: {raw}").into())
}

fn parse_args(args: &[String]) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-b" | "--batch" => config.batch_mode = true,
            "--trace" => config.trace = true,
            "--json" => config.json = true,
            "--dump" => config.dump = true,
            "--base" => config.base = Some(value(args, &mut i, "--base")?),
            "--max-rounds" => config.max_rounds = Some(value(args, &mut i, "--max-rounds")?),
            "--max-derivations" => {
                config.max_derivations = Some(value(args, &mut i, "--max-derivations")?);
            }
            arg if arg.starts_with('-') => {
                return Err(format!("unknown option: {arg}").into());
            }
            path => config.files.push(path.to_string()),
        }
        i += 1;
    }

    Ok(config)
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(&args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("strata {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut reasoner = ReasonerConfig::new();
    if let Some(max) = config.max_rounds {
        reasoner = reasoner.with_max_rounds(max);
    }
    if let Some(max) = config.max_derivations {
        reasoner = reasoner.with_max_derivations(max);
    }
    let observability = if config.trace {
        ObservabilityConfig::tracing()
    } else {
        ObservabilityConfig::default()
    }
    .with_json_output(config.json);

    let base = config.base.as_deref().unwrap_or(DEFAULT_BASE_GRAPH);
    let mut session = Session::with_config(base, reasoner, observability)?;

    for file in &config.files {
        match session.load_file(file)? {
            Loaded::Rules(n) => eprintln!("loaded {n} rule(s) from {file}"),
            Loaded::Facts(n) => eprintln!("loaded {n} fact(s) from {file}"),
        }
    }

    if config.batch_mode {
        let summary = session.run()?;
        println!("{}", format_summary(&summary));
        if config.dump {
            dump(&session)?;
        }
        return Ok(());
    }

    if config.dump {
        dump(&session)?;
    }

    let mut repl = Repl::with_editor(RustylineEditor::new()?, session);
    if !config.files.is_empty() {
        repl = repl.without_banner();
    }
    repl.run()?;
    Ok(())
}

fn dump(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let prefixes = session.prefixes();
    for id in session.graphs() {
        let Some(name) = session.store().graph_name(id) else {
            continue;
        };
        let facts = session.store().get_statements(&Lookup::any(), &[id])?;
        println!("\x1b[1;36m=== {name} ===\x1b[0m");
        for fact in facts {
            println!("{}", format_triple(&fact, Some(prefixes)));
        }
        println!();
    }
    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mstrata\x1b[0m - Forward-chaining rule engine over named graphs

\x1b[1mUSAGE:\x1b[0m
    strata [OPTIONS] [FILES...]

\x1b[1mARGUMENTS:\x1b[0m
    [FILES...]    .rules files hold rules; other files hold facts

\x1b[1mOPTIONS:\x1b[0m
    -h, --help               Print help information
    -V, --version            Print version information
    -b, --batch              Load files, run to a fixpoint, print a summary and exit
    --base IRI               Name of the base graph (default {DEFAULT_BASE_GRAPH})

\x1b[1mDEBUG OPTIONS:\x1b[0m
    --trace                  Print reasoner events to stderr
    --json                   Trace as JSON lines
    --max-rounds N           Fail if the fixpoint needs more than N rounds
    --max-derivations N      Fail if a run derives more than N facts
    --dump                   Print every session graph

\x1b[1mEXAMPLES:\x1b[0m
    strata                                Start interactive REPL
    strata family.rules family.facts      Load, then start REPL
    strata -b family.rules family.facts   Run to a fixpoint and exit
    strata --trace -b --dump sim.rules    Trace the run and dump the result

Type :help in the REPL for its commands."
    );
}
