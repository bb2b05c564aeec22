use crate::closure::{extract_result, ClosureConfig, ClosureState, SolveStats};
use crate::computation::{Completable, ComputationStepAndConvert, Incomplete, Manual};
use crate::matrix::{BoolMatrix, SymbolMatrices};
use cancel_this::is_cancelled;
use log::{debug, warn};

/// The naive closure step: one full pass of `M ← M ∪ (M ·_G M)` over every
/// rule, repeated until no relation grows.
///
/// Every pass multiplies the *entire* closed relations, so each pass redoes
/// all the work of the previous one plus whatever is new. The delta engines
/// exist to avoid exactly that; this step is kept as the reference the
/// optimized engines are validated against.
pub struct NaiveClosure;

impl ComputationStepAndConvert<ClosureConfig, ClosureState, BoolMatrix, Manual> for NaiveClosure {
    fn step(context: &ClosureConfig, state: &mut ClosureState) -> Completable<()> {
        // The shared initialization seeds the front; the naive engine works
        // on the closed relation alone, so absorb the seed first.
        if !state.front.is_empty() {
            let seed = std::mem::replace(&mut state.front, SymbolMatrices::new(context.size()));
            state.closed.union_with(&seed);
        }

        if state.iteration >= context.max_iterations {
            warn!(
                "[iteration:{}] NaiveClosure exceeded ClosureConfig::max_iterations; \
                 returning the closed relation as-is.",
                state.iteration
            );
            return Ok(());
        }
        state.iteration += 1;

        // The closure is monotone, so an unchanged pair count is the same
        // quiescence test as set equality against a snapshot.
        let before = state.closed.total_nvals();

        for &(lhs, x, y) in context.grammar.buckets().cnf() {
            is_cancelled!()?;
            let product = rule_product(state.closed.get(x), state.closed.get(y), &mut state.stats);
            if let Some(product) = product {
                state.closed.absorb(lhs, product);
            }
        }
        for &(lhs, nonterminal, terminal) in context.grammar.buckets().ext_left() {
            is_cancelled!()?;
            let product = rule_product(
                state.closed.get(nonterminal),
                context.graph.matrix(terminal),
                &mut state.stats,
            );
            if let Some(product) = product {
                state.closed.absorb(lhs, product);
            }
        }
        for &(lhs, terminal, nonterminal) in context.grammar.buckets().ext_right() {
            is_cancelled!()?;
            let product = rule_product(
                context.graph.matrix(terminal),
                state.closed.get(nonterminal),
                &mut state.stats,
            );
            if let Some(product) = product {
                state.closed.absorb(lhs, product);
            }
        }
        for &(lhs, rhs) in context.grammar.unary_rules() {
            is_cancelled!()?;
            if !context.grammar.is_nonterminal(rhs) {
                continue;
            }
            if let Some(matrix) = state.closed.get(rhs) {
                if !matrix.is_empty() {
                    let matrix = matrix.clone();
                    state.closed.union_into(lhs, &matrix);
                }
            }
        }

        let after = state.closed.total_nvals();
        if after == before {
            debug!(
                "[iteration:{}] NaiveClosure finished with {} pairs.",
                state.iteration, after
            );
            Ok(())
        } else {
            debug!(
                "[iteration:{}] NaiveClosure increased to {} pairs.",
                state.iteration, after
            );
            Err(Incomplete::Working)
        }
    }

    fn output(context: &ClosureConfig, state: ClosureState) -> BoolMatrix {
        extract_result(context, state)
    }
}

/// Evaluate one rule product, skipping missing or empty operands (their
/// product is necessarily empty) and empty results.
fn rule_product(
    left: Option<&BoolMatrix>,
    right: Option<&BoolMatrix>,
    stats: &mut SolveStats,
) -> Option<BoolMatrix> {
    let (Some(left), Some(right)) = (left, right) else {
        return None;
    };
    if left.is_empty() || right.is_empty() {
        return None;
    }
    stats.multiplications += 1;
    let product = left.multiply(right);
    if product.is_empty() {
        None
    } else {
        Some(product)
    }
}
