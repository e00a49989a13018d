use crate::service::PipelineState;

/// Hook for watching a request move through the pipeline.
///
/// Calls happen on the thread running the request. Both methods default to
/// doing nothing.
pub trait PipelineObserver: Send + Sync {
    fn on_transition(&self, _from: PipelineState, _to: PipelineState) {}

    /// Called before chunk `index` (0-based) of `total` is transcribed.
    fn on_chunk(&self, _index: usize, _total: usize) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}
