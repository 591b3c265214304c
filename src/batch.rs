//! Many traces, one model.
//!
//! Each trace gets its own product, oracles and search; results come back in
//! input order. With the `parallel` feature the searches run on the rayon
//! pool.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::builder::Aligner;
use crate::engine::AlignmentResult;
use crate::error::AlignError;
use crate::product::ProcessModel;

/// Align every trace of `traces` against `model`.
#[cfg(feature = "parallel")]
pub fn align_traces<T, S>(
    aligner: &Aligner,
    traces: &[T],
    model: &ProcessModel,
) -> Vec<Result<AlignmentResult, AlignError>>
where
    T: AsRef<[S]> + Sync,
    S: AsRef<str> + Sync,
{
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("align_traces", traces = traces.len(), parallel = true).entered();
    traces
        .par_iter()
        .map(|trace| aligner.align(trace.as_ref(), model))
        .collect()
}

/// Align every trace of `traces` against `model`.
#[cfg(not(feature = "parallel"))]
pub fn align_traces<T, S>(
    aligner: &Aligner,
    traces: &[T],
    model: &ProcessModel,
) -> Vec<Result<AlignmentResult, AlignError>>
where
    T: AsRef<[S]> + Sync,
    S: AsRef<str> + Sync,
{
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("align_traces", traces = traces.len(), parallel = false).entered();
    traces
        .iter()
        .map(|trace| aligner.align(trace.as_ref(), model))
        .collect()
}

/// Total cost over all traces that could be aligned, and how many could not.
pub fn total_cost(results: &[Result<AlignmentResult, AlignError>]) -> (u64, usize) {
    results.iter().fold((0, 0), |(cost, failed), result| match result {
        Ok(alignment) => (cost.saturating_add(alignment.cost), failed),
        Err(_) => (cost, failed + 1),
    })
}
