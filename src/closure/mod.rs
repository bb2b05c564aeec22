//! Fixed-point closure engines for CFL-reachability.
//!
//! Every engine iterates one boolean relation per nonterminal until no rule
//! can derive a new vertex pair, then hands back the start nonterminal's
//! relation. The engines differ only in how much work one iteration
//! performs:
//!
//! - [`BaseClosure`]: the naive `M ← M ∪ (M ·_G M)` pass over every rule.
//! - [`IncrementalClosure`]: front/delta propagation — only products
//!   involving newly derived pairs are evaluated.
//! - [`TrivialProductClosure`]: incremental, plus elision of products with
//!   an empty operand.
//! - [`LazyAdditionClosure`]: incremental, plus deferred matrix additions
//!   behind the sparsity-gap invariant.
//! - [`FullyOptimizedClosure`]: all of the above.
//!
//! [`Strategy`] names the engines (plus `Auto`, which picks one from the
//! input size), and [`solve`] is the one-call entry point.
//!
//! # Example
//!
//! ```no_run
//! use cfl_reach::closure::{solve, Strategy};
//! use cfl_reach::grammar::{Grammar, SymbolTable};
//! use cfl_reach::graph::LabelDecomposedGraph;
//!
//! let mut symbols = SymbolTable::new();
//! let grammar = Grammar::from_file("grammar.cnf", &mut symbols).unwrap();
//! let graph = LabelDecomposedGraph::from_file("graph.txt", &mut symbols).unwrap();
//!
//! let reachable = solve(grammar, graph, symbols, Strategy::Auto).unwrap();
//! println!("{} reachable pairs", reachable.nvals());
//! ```

use crate::computation::{Algorithm, Computation, Manual};
use crate::grammar::{Grammar, SymbolTable};
use crate::graph::LabelDecomposedGraph;
use crate::log_matrix;
use crate::matrix::BoolMatrix;
use cancel_this::Cancellable;
use log::{info, warn};
use std::fmt::{Display, Formatter};

#[cfg(test)]
mod tests;

mod closure_config;
mod closure_state;
mod delta;
mod naive;
mod stats;
mod step_operators;

pub use closure_config::ClosureConfig;
pub use closure_state::ClosureState;
pub use delta::DeltaClosure;
pub use naive::NaiveClosure;
pub use stats::SolveStats;
pub use step_operators::{
    AccumulationPolicy, AlwaysMultiply, DeferredAdditions, EagerAdditions, ProductPolicy,
    SkipEmptyOperands,
};

/// A helper alias which allows us to use [`ClosureComputation`] as shorthand
/// for `Computation<Context = ClosureConfig, State = ClosureState>`.
pub type ClosureComputation<STEP> = Computation<ClosureConfig, ClosureState, BoolMatrix, STEP, Manual>;

/// A helper trait which allows us to use [`ClosureAlgorithm`] as shorthand
/// for `Algorithm<ClosureConfig, ClosureState, BoolMatrix>`.
pub trait ClosureAlgorithm: Algorithm<ClosureConfig, ClosureState, BoolMatrix> + 'static {}
impl<T: Algorithm<ClosureConfig, ClosureState, BoolMatrix> + 'static> ClosureAlgorithm for T {}

/// The naive reference engine.
pub type BaseClosure = ClosureComputation<NaiveClosure>;

/// Front/delta propagation without further optimizations.
pub type IncrementalClosure = ClosureComputation<DeltaClosure<AlwaysMultiply, EagerAdditions>>;

/// Front/delta propagation with trivial-product elision.
pub type TrivialProductClosure = ClosureComputation<DeltaClosure<SkipEmptyOperands, EagerAdditions>>;

/// Front/delta propagation with lazy (deferred) matrix additions.
pub type LazyAdditionClosure = ClosureComputation<DeltaClosure<AlwaysMultiply, DeferredAdditions>>;

/// Front/delta propagation with both trivial-product elision and lazy
/// additions.
pub type FullyOptimizedClosure = ClosureComputation<DeltaClosure<SkipEmptyOperands, DeferredAdditions>>;

/// The engine used by one `solve` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Base,
    Incremental,
    Trivial,
    Lazy,
    Full,
    /// Pick an engine from the input characteristics; see
    /// [`Strategy::select`].
    Auto,
}

impl Strategy {
    /// Every concrete engine, in increasing order of optimization.
    pub const ALL: [Strategy; 5] = [
        Strategy::Base,
        Strategy::Incremental,
        Strategy::Trivial,
        Strategy::Lazy,
        Strategy::Full,
    ];

    /// Resolve `Auto` against the input characteristics.
    ///
    /// Small graphs get the incremental engine with trivial checks — the
    /// lazy bookkeeping does not pay for itself there. Mid-size graphs
    /// additionally defer additions when the grammar is large enough for
    /// many products per iteration. Large graphs get everything.
    pub fn select(vertex_count: usize, binary_rule_count: usize) -> Strategy {
        if vertex_count < 500 {
            Strategy::Trivial
        } else if vertex_count < 10_000 {
            if binary_rule_count > 100 {
                Strategy::Full
            } else {
                Strategy::Trivial
            }
        } else {
            Strategy::Full
        }
    }

    fn resolve(self, config: &ClosureConfig) -> Strategy {
        match self {
            Strategy::Auto => {
                let resolved =
                    Strategy::select(config.size(), config.grammar.binary_rules().len());
                info!(
                    "Auto strategy resolved to `{}` (n={}; binary rules={}).",
                    resolved,
                    config.size(),
                    config.grammar.binary_rules().len()
                );
                resolved
            }
            concrete => concrete,
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Strategy::Base => "base",
            Strategy::Incremental => "incremental",
            Strategy::Trivial => "trivial",
            Strategy::Lazy => "lazy",
            Strategy::Full => "full",
            Strategy::Auto => "auto",
        };
        write!(f, "{name}")
    }
}

/// Compute the CFL-reachability relation of the grammar's start nonterminal
/// over the graph, using the given strategy.
///
/// The symbol table must be the one that interned both the grammar and the
/// graph. The returned matrix is owned by the caller and independent of any
/// engine state.
pub fn solve(
    grammar: Grammar,
    graph: LabelDecomposedGraph,
    symbols: SymbolTable,
    strategy: Strategy,
) -> Cancellable<BoolMatrix> {
    solve_with_config(ClosureConfig::new(grammar, graph, symbols), strategy)
}

/// Like [`solve`], but with full control over the configuration (iteration
/// cap, lazy gap factor).
pub fn solve_with_config(config: ClosureConfig, strategy: Strategy) -> Cancellable<BoolMatrix> {
    let strategy = strategy.resolve(&config);
    info!(
        "Solving with the `{}` engine (n={}; labels={}; rules={}).",
        strategy,
        config.size(),
        config.graph.labels().count(),
        config.grammar.epsilon_rules().len()
            + config.grammar.unary_rules().len()
            + config.grammar.binary_rules().len()
    );

    let state = ClosureState::initial(&config);
    match strategy {
        Strategy::Base => run_engine::<BaseClosure>(config, state),
        Strategy::Incremental => run_engine::<IncrementalClosure>(config, state),
        Strategy::Trivial => run_engine::<TrivialProductClosure>(config, state),
        Strategy::Lazy => run_engine::<LazyAdditionClosure>(config, state),
        Strategy::Full => run_engine::<FullyOptimizedClosure>(config, state),
        Strategy::Auto => unreachable!("`Auto` resolves to a concrete engine before dispatch"),
    }
}

fn run_engine<A: ClosureAlgorithm>(
    config: ClosureConfig,
    state: ClosureState,
) -> Cancellable<BoolMatrix> {
    A::configure(config, state).compute()
}

/// Shared `STATE → OUTPUT` conversion of every engine: move the start
/// nonterminal's relation out of the closed map.
///
/// A start symbol that derived nothing yields an empty `n×n` matrix — the
/// described language is empty over this graph, which is an answer, not an
/// error.
pub(crate) fn extract_result(context: &ClosureConfig, mut state: ClosureState) -> BoolMatrix {
    info!(
        "Closure done after {} iterations ({}).",
        state.iteration, state.stats
    );
    match state.closed.remove(context.grammar.start()) {
        Some(matrix) => {
            info!("Result: {}.", log_matrix(&matrix));
            matrix
        }
        None => {
            warn!(
                "Start nonterminal `{}` derived no pairs; returning the empty relation.",
                context.symbols.name(context.grammar.start())
            );
            BoolMatrix::zero(context.size())
        }
    }
}
