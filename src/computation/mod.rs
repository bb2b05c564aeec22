//! Abstract implementation of stateful, resumable "computations".
//!
//! These are generally similar to asynchronous operations but optimized for
//! CPU-bound tasks that should remain pollable and cancellable between steps.
//!
//! The core idea is that every [`Computation`] has:
//!  - `CONTEXT`; some immutable object that provides configuration for the
//!    computation.
//!  - `STATE`; a mutable object that is changed by repeatedly invoking
//!    [`ComputationStep`].
//!  - `OUTPUT`; the type of data that `STATE` is converted to once the
//!    computation is done.
//!
//! The operation is split into two methods: first, `step` is repeatedly
//! called with `CONTEXT` and mutable `STATE` until completion (`Ok(())` is
//! returned). Then, `output` is called once to convert the owned `STATE`
//! into `OUTPUT` (also with access to `CONTEXT`).
//!
//!  > Implementations should be robust towards calling `step` even after
//!  > `()` was already returned. It is still allowed to return any number of
//!  > `Working` values as long as the implementation eventually returns `()`
//!  > again (assuming the operation is not canceled).
//!
//! ## Basic computation
//!
//! ```rust
//! # use cfl_reach::computation::{Completable, Computation, ComputationStep, Incomplete};
//! struct Counter;
//!
//! impl ComputationStep<usize, usize, usize> for Counter {
//!     fn step(context: &usize, state: &mut usize) -> Completable<()> {
//!         if *state >= *context {
//!             Ok(())
//!         } else {
//!             *state += 1;
//!             Err(Incomplete::Working)
//!         }
//!     }
//! }
//!
//! // Type arguments of `Computation`:
//! // 1: The `CONTEXT`, here the target counter value.
//! // 2: The `STATE`, here the current counter value.
//! // 3: The `OUTPUT`, here the final count.
//! // 4: The actual "step operator" that performs state mutation.
//! type CounterComputation = Computation<usize, usize, usize, Counter>;
//!
//! // We can "run" the computation as a cancellable function:
//! assert_eq!(CounterComputation::run(10usize, 0usize).unwrap(), 10);
//!
//! // We can also create the computation object and poll it until completion:
//! let mut computation = CounterComputation::configure(6usize, 3usize);
//! assert_eq!(computation.try_compute(), Err(Incomplete::Working)); // 4
//! assert_eq!(computation.try_compute(), Err(Incomplete::Working)); // 5
//! assert_eq!(computation.try_compute(), Err(Incomplete::Working)); // 6
//! assert_eq!(computation.try_compute(), Ok(&6)); // done
//! ```
//!
//! ## Background
//!
//! There is a range of reasons for this design:
//!
//!  - The `step` function can't directly take ownership of `state`, because
//!    the state would be lost if the operation is canceled (i.e., it would
//!    not be possible to resume the computation).
//!  - The `output` function cannot be cancellable for exactly this reason
//!    (state would be lost if canceled during conversion). Any long-running
//!    work belongs in `step`.
//!  - If the conversion is trivial (i.e., `STATE` implements `Into<OUTPUT>`),
//!    it is derived automatically by implementing [`ComputationStep`]. For
//!    conversions that need `CONTEXT` (like extracting the start-symbol
//!    matrix from a closure state), implement [`ComputationStepAndConvert`]
//!    directly with the [`Manual`] strategy.
//!  - Taking ownership of `state` for the `output` conversion allows moving
//!    the result out of the computation state instead of cloning it.

use cancel_this::{Cancellable, Cancelled};
use std::fmt::{Display, Formatter};

#[allow(clippy::module_inception)]
mod computation;

pub use computation::{Computation, ComputationStep, ComputationStepAndConvert, Derived, Manual};

/// Implemented by computations that can be configured from a `CONTEXT` and an
/// initial `STATE`, either as a concrete type or behind a [`DynAlgorithm`].
pub trait Algorithm<CONTEXT, STATE, OUTPUT>: Computable<OUTPUT> {
    fn configure<I1: Into<CONTEXT>, I2: Into<STATE>>(context: I1, initial_state: I2) -> Self
    where
        Self: Sized;

    fn configure_dyn<I1: Into<CONTEXT>, I2: Into<STATE>>(
        context: I1,
        initial_state: I2,
    ) -> DynAlgorithm<CONTEXT, STATE, OUTPUT>
    where
        Self: Sized + 'static,
    {
        Box::new(Self::configure(context, initial_state))
    }
}

/// A computation that can be polled (`try_compute`) or driven to completion
/// (`compute`).
pub trait Computable<T> {
    fn try_compute(&mut self) -> Completable<&T>;
    fn compute(self) -> Cancellable<T>;
}

pub type DynComputable<T> = Box<dyn Computable<T>>;
pub type DynAlgorithm<CONTEXT, STATE, OUTPUT> = Box<dyn Algorithm<CONTEXT, STATE, OUTPUT>>;

/// A [`Completable`] result is a value that is eventually computed by an
/// algorithm, but the computation can be incomplete when the value is polled.
pub type Completable<T> = Result<T, Incomplete>;

/// The error type returned by an algorithm when the result is not available.
///
/// The result can be unavailable because the computation was canceled or
/// because the algorithm has not finished yet but reached one of its
/// pre-defined interruption points.
#[derive(Debug, Clone)]
pub enum Incomplete {
    Working,
    Cancelled(Cancelled),
}

impl PartialEq for Incomplete {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Incomplete::Working, Incomplete::Working) => true,
            (Incomplete::Cancelled(a), Incomplete::Cancelled(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl From<Cancelled> for Incomplete {
    fn from(value: Cancelled) -> Self {
        Incomplete::Cancelled(value)
    }
}

impl Display for Incomplete {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Incomplete::Working => write!(f, "Computation not finished"),
            Incomplete::Cancelled(c) => write!(f, "{}", c),
        }
    }
}

impl std::error::Error for Incomplete {}

#[cfg(test)]
mod tests {
    use crate::computation::{Completable, Computation, ComputationStep, Incomplete};

    #[test]
    fn simple_computation() {
        /// A simple "counter" that iterates until the limit given by
        /// `context` is reached.
        ///
        /// Note that the output state conversion is implemented automatically.
        struct CounterStep;
        impl ComputationStep<usize, usize, usize> for CounterStep {
            fn step(context: &usize, state: &mut usize) -> Completable<()> {
                if *state >= *context {
                    Ok(())
                } else {
                    *state += 1;
                    Err(Incomplete::Working)
                }
            }
        }

        type CounterComputation = Computation<usize, usize, usize, CounterStep>;
        let result = CounterComputation::run(10usize, 0usize).unwrap();
        assert_eq!(result, 10);
    }

    #[test]
    fn polled_computation_retains_output() {
        struct CounterStep;
        impl ComputationStep<usize, usize, usize> for CounterStep {
            fn step(context: &usize, state: &mut usize) -> Completable<()> {
                if *state >= *context {
                    Ok(())
                } else {
                    *state += 1;
                    Err(Incomplete::Working)
                }
            }
        }

        type CounterComputation = Computation<usize, usize, usize, CounterStep>;
        let mut computation = CounterComputation::configure(2usize, 0usize);
        assert_eq!(computation.try_compute(), Err(Incomplete::Working));
        assert_eq!(computation.try_compute(), Err(Incomplete::Working));
        assert_eq!(computation.try_compute(), Ok(&2));
        // Polling after completion keeps returning the stored output.
        assert_eq!(computation.try_compute(), Ok(&2));
        assert_eq!(computation.output(), Some(2));
    }
}
