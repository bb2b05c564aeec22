use crate::closure::step_operators::{apply_all, AccumulationPolicy, ProductPolicy};
use crate::closure::{extract_result, ClosureConfig, ClosureState};
use crate::computation::{Completable, ComputationStepAndConvert, Incomplete, Manual};
use crate::matrix::BoolMatrix;
use crate::simple_type_name;
use log::{debug, warn};
use std::marker::PhantomData;

/// The incremental closure step, driving the front/delta fixpoint
///
/// ```text
/// Δ_tmp ← apply_all(M, Δ)
/// M     ← M ∪ Δ
/// Δ     ← Δ_tmp \ M
/// ```
///
/// until the front is empty. Only products involving the front can produce
/// pairs that are not already closed, so each iteration costs work
/// proportional to what is new rather than to everything derived so far.
///
/// The step is parameterized by a [`ProductPolicy`] (whether products with
/// an empty operand are elided) and an [`AccumulationPolicy`] (whether the
/// per-iteration contributions are added eagerly or deferred behind the
/// sparsity-gap invariant), which together span the incremental, trivial,
/// lazy and fully-optimized engines.
pub struct DeltaClosure<MUL: ProductPolicy, ADD: AccumulationPolicy>(PhantomData<(MUL, ADD)>);

impl<MUL: ProductPolicy, ADD: AccumulationPolicy>
    ComputationStepAndConvert<ClosureConfig, ClosureState, BoolMatrix, Manual>
    for DeltaClosure<MUL, ADD>
{
    fn step(context: &ClosureConfig, state: &mut ClosureState) -> Completable<()> {
        if state.front.is_empty() {
            debug!(
                "[iteration:{}] DeltaClosure<{}, {}> finished with {} pairs.",
                state.iteration,
                simple_type_name::<MUL>(),
                simple_type_name::<ADD>(),
                state.closed.total_nvals()
            );
            return Ok(());
        }

        if state.iteration >= context.max_iterations {
            warn!(
                "[iteration:{}] DeltaClosure<{}, {}> exceeded \
                 ClosureConfig::max_iterations; returning the closed relation as-is.",
                state.iteration,
                simple_type_name::<MUL>(),
                simple_type_name::<ADD>(),
            );
            return Ok(());
        }
        state.iteration += 1;

        let mut buffer = ADD::buffer(context);
        apply_all::<MUL, ADD>(
            context,
            &state.closed,
            &state.front,
            &mut buffer,
            &mut state.stats,
        )?;

        state.closed.union_with(&state.front);
        state.front = ADD::finish(buffer).difference(&state.closed);

        debug!(
            "[iteration:{}] DeltaClosure<{}, {}> closed {} pairs; front carries {}.",
            state.iteration,
            simple_type_name::<MUL>(),
            simple_type_name::<ADD>(),
            state.closed.total_nvals(),
            state.front.total_nvals()
        );
        Err(Incomplete::Working)
    }

    fn output(context: &ClosureConfig, state: ClosureState) -> BoolMatrix {
        extract_result(context, state)
    }
}
