use crate::closure::{ClosureConfig, SolveStats};
use crate::grammar::Symbol;
use crate::matrix::{BoolMatrix, LazySymbolMatrices, SymbolMatrices};
use cancel_this::{is_cancelled, Cancellable};

/// How the delta engines evaluate a single boolean product.
pub trait ProductPolicy {
    /// Multiply `left · right`, or return `None` when the policy elides the
    /// product. Eliding is only allowed when the product is provably empty.
    fn multiply(
        left: &BoolMatrix,
        right: &BoolMatrix,
        stats: &mut SolveStats,
    ) -> Option<BoolMatrix>;
}

/// Performs every product, including those with an empty operand.
pub struct AlwaysMultiply;

/// Elides products with an empty operand; an empty operand implies an empty
/// product, so skipping preserves the result exactly.
pub struct SkipEmptyOperands;

impl ProductPolicy for AlwaysMultiply {
    fn multiply(
        left: &BoolMatrix,
        right: &BoolMatrix,
        stats: &mut SolveStats,
    ) -> Option<BoolMatrix> {
        stats.multiplications += 1;
        Some(left.multiply(right))
    }
}

impl ProductPolicy for SkipEmptyOperands {
    fn multiply(
        left: &BoolMatrix,
        right: &BoolMatrix,
        stats: &mut SolveStats,
    ) -> Option<BoolMatrix> {
        if left.is_empty() || right.is_empty() {
            stats.skipped_products += 1;
            None
        } else {
            stats.multiplications += 1;
            Some(left.multiply(right))
        }
    }
}

/// Where the delta engines put product contributions within one iteration.
///
/// The eager policy ORs each contribution into a concrete per-symbol matrix
/// immediately; the deferred policy parks contributions in a lazy matrix set
/// and materializes the whole buffer once, right before the difference step.
pub trait AccumulationPolicy {
    type Buffer;

    fn buffer(config: &ClosureConfig) -> Self::Buffer;

    fn add(buffer: &mut Self::Buffer, symbol: Symbol, matrix: BoolMatrix, stats: &mut SolveStats);

    fn finish(buffer: Self::Buffer) -> SymbolMatrices;
}

/// OR every contribution into its slot as soon as it is produced.
pub struct EagerAdditions;

/// Defer additions behind the sparsity-gap invariant of a lazy matrix set.
pub struct DeferredAdditions;

impl AccumulationPolicy for EagerAdditions {
    type Buffer = SymbolMatrices;

    fn buffer(config: &ClosureConfig) -> SymbolMatrices {
        SymbolMatrices::new(config.size())
    }

    fn add(buffer: &mut SymbolMatrices, symbol: Symbol, matrix: BoolMatrix, _: &mut SolveStats) {
        buffer.absorb(symbol, matrix);
    }

    fn finish(buffer: SymbolMatrices) -> SymbolMatrices {
        buffer
    }
}

impl AccumulationPolicy for DeferredAdditions {
    type Buffer = LazySymbolMatrices;

    fn buffer(config: &ClosureConfig) -> LazySymbolMatrices {
        LazySymbolMatrices::new(config.size(), config.lazy_gap)
    }

    fn add(
        buffer: &mut LazySymbolMatrices,
        symbol: Symbol,
        matrix: BoolMatrix,
        stats: &mut SolveStats,
    ) {
        stats.deferred_additions += 1;
        buffer.add(symbol, &matrix);
    }

    fn finish(buffer: LazySymbolMatrices) -> SymbolMatrices {
        buffer.materialize_all()
    }
}

/// One whole rule pass of the delta engine: contribute every product of the
/// closed relation and the front into `buffer`.
///
/// Each listed case is *independent* — a rule may fire in several ways in the
/// same iteration (e.g. `S → S S` once `S` has pairs in both the closed
/// relation and the front), so none of the cases may short-circuit another.
/// Over-approximation is fine: the caller subtracts the closed relation from
/// the result afterwards.
pub fn apply_all<MUL: ProductPolicy, ADD: AccumulationPolicy>(
    context: &ClosureConfig,
    closed: &SymbolMatrices,
    front: &SymbolMatrices,
    buffer: &mut ADD::Buffer,
    stats: &mut SolveStats,
) -> Cancellable<()> {
    apply_cnf::<MUL, ADD>(context, closed, front, buffer, stats)?;
    apply_ext_left::<MUL, ADD>(context, closed, front, buffer, stats)?;
    apply_ext_right::<MUL, ADD>(context, closed, front, buffer, stats)?;
    apply_unary::<ADD>(context, front, buffer, stats)?;
    Ok(())
}

/// CNF rules `A → X Y`: contribute `Δ[X]·Δ[Y]`, `M[X]·Δ[Y]` and `Δ[X]·M[Y]`.
fn apply_cnf<MUL: ProductPolicy, ADD: AccumulationPolicy>(
    context: &ClosureConfig,
    closed: &SymbolMatrices,
    front: &SymbolMatrices,
    buffer: &mut ADD::Buffer,
    stats: &mut SolveStats,
) -> Cancellable<()> {
    for &(lhs, x, y) in context.grammar.buckets().cnf() {
        is_cancelled!()?;
        contribute::<MUL, ADD>(front.get(x), front.get(y), lhs, buffer, stats);
        contribute::<MUL, ADD>(closed.get(x), front.get(y), lhs, buffer, stats);
        contribute::<MUL, ADD>(front.get(x), closed.get(y), lhs, buffer, stats);
    }
    Ok(())
}

/// Extended-left rules `A → B t`: contribute `Δ[B]·G[t]` and `M[B]·G[t]`.
fn apply_ext_left<MUL: ProductPolicy, ADD: AccumulationPolicy>(
    context: &ClosureConfig,
    closed: &SymbolMatrices,
    front: &SymbolMatrices,
    buffer: &mut ADD::Buffer,
    stats: &mut SolveStats,
) -> Cancellable<()> {
    for &(lhs, nonterminal, terminal) in context.grammar.buckets().ext_left() {
        is_cancelled!()?;
        let Some(label) = context.graph.matrix(terminal) else {
            continue;
        };
        contribute::<MUL, ADD>(front.get(nonterminal), Some(label), lhs, buffer, stats);
        contribute::<MUL, ADD>(closed.get(nonterminal), Some(label), lhs, buffer, stats);
    }
    Ok(())
}

/// Extended-right rules `A → t B`: contribute `G[t]·Δ[B]` and `G[t]·M[B]`.
fn apply_ext_right<MUL: ProductPolicy, ADD: AccumulationPolicy>(
    context: &ClosureConfig,
    closed: &SymbolMatrices,
    front: &SymbolMatrices,
    buffer: &mut ADD::Buffer,
    stats: &mut SolveStats,
) -> Cancellable<()> {
    for &(lhs, terminal, nonterminal) in context.grammar.buckets().ext_right() {
        is_cancelled!()?;
        let Some(label) = context.graph.matrix(terminal) else {
            continue;
        };
        contribute::<MUL, ADD>(Some(label), front.get(nonterminal), lhs, buffer, stats);
        contribute::<MUL, ADD>(Some(label), closed.get(nonterminal), lhs, buffer, stats);
    }
    Ok(())
}

/// Unary rules `A → B` with nonterminal `B`: new `B`-pairs become new
/// `A`-pairs. Terminal right-hand sides were absorbed into the initial front
/// and never change.
fn apply_unary<ADD: AccumulationPolicy>(
    context: &ClosureConfig,
    front: &SymbolMatrices,
    buffer: &mut ADD::Buffer,
    stats: &mut SolveStats,
) -> Cancellable<()> {
    for &(lhs, rhs) in context.grammar.unary_rules() {
        is_cancelled!()?;
        if !context.grammar.is_nonterminal(rhs) {
            continue;
        }
        if let Some(matrix) = front.get(rhs) {
            if !matrix.is_empty() {
                ADD::add(buffer, lhs, matrix.clone(), stats);
            }
        }
    }
    Ok(())
}

fn contribute<MUL: ProductPolicy, ADD: AccumulationPolicy>(
    left: Option<&BoolMatrix>,
    right: Option<&BoolMatrix>,
    lhs: Symbol,
    buffer: &mut ADD::Buffer,
    stats: &mut SolveStats,
) {
    let (Some(left), Some(right)) = (left, right) else {
        return;
    };
    if let Some(product) = MUL::multiply(left, right, stats) {
        if !product.is_empty() {
            ADD::add(buffer, lhs, product, stats);
        }
    }
}
