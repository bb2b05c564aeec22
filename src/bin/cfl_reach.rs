use cfl_reach::closure::{solve, Strategy};
use cfl_reach::error::ReadError;
use cfl_reach::grammar::{template, Grammar, SymbolTable};
use cfl_reach::graph::LabelDecomposedGraph;
use cfl_reach::matrix::BoolMatrix;
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Builder;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "cfl-reach")]
#[command(about = "Context-free reachability queries over edge-labeled graphs")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose logging level: "trace", "debug", or "info"
    /// If specified without a value (--verbose or -v), defaults to "info"
    /// Use --verbose=LEVEL to specify a level, or just --verbose/-v for info
    #[arg(long, short = 'v', value_name = "LEVEL", num_args = 0..=1, default_missing_value = "info", require_equals = true, global = true)]
    verbose: Option<Option<LogLevel>>,
}

#[derive(Subcommand)]
enum Command {
    /// Solve one (grammar, graph) instance and print the reachable pairs
    Solve {
        /// Path to the grammar file (.cnf)
        #[arg(long, value_name = "FILE")]
        grammar: PathBuf,

        /// Path to the graph file (.txt or .csv)
        #[arg(long, value_name = "FILE")]
        graph: PathBuf,

        /// Engine to use
        #[arg(long, default_value = "auto", require_equals = true)]
        algo: Algo,

        /// Write the result pairs (row<TAB>col per line) to this file
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Run the bundled scenario suite with one engine
    Test {
        /// Engine to use (default: auto)
        algo: Option<Algo>,

        /// Directory holding the scenario corpora
        #[arg(long, value_name = "DIR", default_value = "test_data")]
        data: PathBuf,
    },

    /// Run every engine on one instance and report wall times
    Benchmark {
        /// Path to the grammar file (defaults to a bundled scenario)
        grammar: Option<PathBuf>,

        /// Path to the graph file (defaults to a bundled scenario)
        graph: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Algo {
    Base,
    Incremental,
    Trivial,
    Lazy,
    Full,
    Auto,
}

impl From<Algo> for Strategy {
    fn from(value: Algo) -> Self {
        match value {
            Algo::Base => Strategy::Base,
            Algo::Incremental => Strategy::Incremental,
            Algo::Trivial => Strategy::Trivial,
            Algo::Lazy => Strategy::Lazy,
            Algo::Full => Strategy::Full,
            Algo::Auto => Strategy::Auto,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Handle the verbose flag: None = not specified, Some(None) = specified
    // without value (defaults to info), Some(Some(level)) = specified with value.
    let log_level = match args.verbose {
        None => LevelFilter::Off,
        Some(None) => LevelFilter::Info,
        Some(Some(level)) => level.into(),
    };
    Builder::from_default_env().filter_level(log_level).init();

    match args.command {
        Command::Solve {
            grammar,
            graph,
            algo,
            output,
        } => run_solve(&grammar, &graph, algo.into(), output.as_deref()),
        Command::Test { algo, data } => {
            run_test(algo.map(Strategy::from).unwrap_or(Strategy::Auto), &data)
        }
        Command::Benchmark { grammar, graph } => {
            let grammar = grammar.unwrap_or_else(|| PathBuf::from("test_data/an_bn/grammar.cnf"));
            let graph = graph.unwrap_or_else(|| PathBuf::from("test_data/an_bn/graph.txt"));
            run_benchmark(&grammar, &graph)
        }
    }
}

/// Load one instance, expanding grammar templates against the graph labels
/// first. Returns the inputs plus the temporary expanded-grammar path (if
/// one was created) so the caller can remove it.
fn load_instance(
    grammar_path: &Path,
    graph_path: &Path,
) -> Result<(Grammar, LabelDecomposedGraph, SymbolTable, Option<PathBuf>), ReadError> {
    let effective = template::expand_if_needed(grammar_path, graph_path)?;
    let temporary = (effective != grammar_path).then(|| effective.clone());

    let mut symbols = SymbolTable::new();
    let grammar = Grammar::from_file(&effective, &mut symbols)?;
    let graph = LabelDecomposedGraph::from_file(graph_path, &mut symbols)?;
    Ok((grammar, graph, symbols, temporary))
}

fn cleanup(temporary: Option<PathBuf>) {
    if let Some(path) = temporary {
        let _ = std::fs::remove_file(path);
    }
}

fn run_solve(
    grammar_path: &Path,
    graph_path: &Path,
    strategy: Strategy,
    output: Option<&Path>,
) -> ExitCode {
    let (grammar, graph, symbols, temporary) = match load_instance(grammar_path, graph_path) {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "Loaded graph with {} vertices and {} edges.",
        graph.size(),
        graph.edge_count()
    );

    let start = Instant::now();
    let result = solve(grammar, graph, symbols, strategy);
    let elapsed = start.elapsed();
    cleanup(temporary);

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: solve canceled: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("Time: {:.6} seconds", elapsed.as_secs_f64());
    println!("Reachable pairs: {}", result.nvals());

    let mut pairs: Vec<(u32, u32)> = result.pairs().collect();
    pairs.sort_unstable();
    for &(u, v) in pairs.iter().take(10) {
        println!("  ({u}, {v})");
    }
    if pairs.len() > 10 {
        println!("  ... ({} more)", pairs.len() - 10);
    }

    if let Some(path) = output {
        let mut text = String::new();
        for &(u, v) in &pairs {
            text.push_str(&format!("{u}\t{v}\n"));
        }
        if let Err(e) = std::fs::write(path, text) {
            eprintln!("Error: cannot write `{}`: {e}", path.display());
            return ExitCode::FAILURE;
        }
        println!("Result written to `{}`.", path.display());
    }

    ExitCode::SUCCESS
}

fn read_expected_pairs(path: &Path) -> std::io::Result<Vec<(u32, u32)>> {
    let text = std::fs::read_to_string(path)?;
    let mut pairs = Vec::new();
    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        if let (Some(row), Some(col)) = (tokens.next(), tokens.next()) {
            if let (Ok(row), Ok(col)) = (row.parse(), col.parse()) {
                pairs.push((row, col));
            }
        }
    }
    pairs.sort_unstable();
    pairs.dedup();
    Ok(pairs)
}

fn run_test(strategy: Strategy, data_dir: &Path) -> ExitCode {
    let entries = match std::fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Error: cannot read test directory `{}`: {e}", data_dir.display());
            return ExitCode::FAILURE;
        }
    };

    let mut scenarios: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.join("grammar.cnf").is_file())
        .collect();
    scenarios.sort();

    if scenarios.is_empty() {
        eprintln!("Error: no scenarios under `{}`.", data_dir.display());
        return ExitCode::FAILURE;
    }

    println!("Running {} scenarios with the `{strategy}` engine.\n", scenarios.len());

    let mut passed = 0;
    for dir in &scenarios {
        let name = dir.file_name().unwrap_or_default().to_string_lossy();
        match run_scenario(dir, strategy) {
            Ok(true) => {
                println!("  {name}: PASSED");
                passed += 1;
            }
            Ok(false) => println!("  {name}: FAILED"),
            Err(e) => println!("  {name}: ERROR ({e})"),
        }
    }

    println!("\nPassed: {passed} / {}", scenarios.len());
    if passed == scenarios.len() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_scenario(dir: &Path, strategy: Strategy) -> Result<bool, Box<dyn std::error::Error>> {
    let grammar_path = dir.join("grammar.cnf");
    let graph_path = dir.join("graph.txt");
    let expected = read_expected_pairs(&dir.join("expected.txt"))?;

    let (grammar, graph, symbols, temporary) = load_instance(&grammar_path, &graph_path)?;
    let result = solve(grammar, graph, symbols, strategy);
    cleanup(temporary);

    let result = result.map_err(|c| format!("solve canceled: {c}"))?;
    let mut pairs: Vec<(u32, u32)> = result.pairs().collect();
    pairs.sort_unstable();

    if pairs == expected {
        return Ok(true);
    }

    // Show a few differences to make failures diagnosable.
    let missing: Vec<_> = expected.iter().filter(|p| !pairs.contains(p)).take(10).collect();
    let extra: Vec<_> = pairs.iter().filter(|p| !expected.contains(p)).take(10).collect();
    if !missing.is_empty() {
        println!("    missing: {missing:?}");
    }
    if !extra.is_empty() {
        println!("    extra: {extra:?}");
    }
    Ok(false)
}

fn run_benchmark(grammar_path: &Path, graph_path: &Path) -> ExitCode {
    println!("Benchmarking all engines on:");
    println!("  grammar: {}", grammar_path.display());
    println!("  graph:   {}\n", graph_path.display());

    let mut reference: Option<u64> = None;
    for strategy in Strategy::ALL {
        let (grammar, graph, symbols, temporary) =
            match load_instance(grammar_path, graph_path) {
                Ok(instance) => instance,
                Err(e) => {
                    eprintln!("Error: {e}");
                    return ExitCode::FAILURE;
                }
            };

        let start = Instant::now();
        let result = solve(grammar, graph, symbols, strategy);
        let elapsed = start.elapsed();
        cleanup(temporary);

        let result: BoolMatrix = match result {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Error: `{strategy}` canceled: {e}");
                return ExitCode::FAILURE;
            }
        };

        println!(
            "  {strategy:<12} {:>10.6} s   {} pairs",
            elapsed.as_secs_f64(),
            result.nvals()
        );

        // The engines must agree with one another; a benchmark that compares
        // engines with different answers is meaningless.
        match reference {
            None => reference = Some(result.nvals()),
            Some(count) if count != result.nvals() => {
                eprintln!("Error: `{strategy}` disagrees with the previous engines.");
                return ExitCode::FAILURE;
            }
            Some(_) => {}
        }
    }

    ExitCode::SUCCESS
}
