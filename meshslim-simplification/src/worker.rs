//! Background simplification worker
//!
//! A submitted mesh is moved into a dedicated thread together with its
//! configuration. The thread runs the same adaptive simplifier as the
//! synchronous path and sends the buffers back over a channel. The caller
//! can only wait with a timeout; a task that misses its deadline is
//! abandoned and its result discarded.

use crate::adaptive::{AdaptiveSimplifier, SimplificationOutcome};
use crate::{DuplicateMerger, VertexReducer};
use flume::{Receiver, RecvTimeoutError};
use meshslim_core::{Error, MeshBuffer, OptimizationConfig, Result};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Buffers handed back by a finished task
#[derive(Debug, Clone)]
pub struct WorkerOutput {
    pub mesh: MeshBuffer,
    pub outcome: SimplificationOutcome,
}

/// Handle to one in-flight simplification
#[derive(Debug)]
pub struct SimplificationTask {
    receiver: Receiver<WorkerOutput>,
}

impl SimplificationTask {
    /// Block until the worker finishes or `timeout` elapses
    pub fn wait(self, timeout: Duration) -> Result<WorkerOutput> {
        match self.receiver.recv_timeout(timeout) {
            Ok(output) => Ok(output),
            Err(RecvTimeoutError::Timeout) => Err(Error::WorkerTimeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(Error::WorkerDisconnected),
        }
    }
}

/// Runs an adaptive simplifier off the calling thread
pub struct SimplificationWorker<R, M> {
    simplifier: Arc<AdaptiveSimplifier<R, M>>,
}

impl<R, M> Clone for SimplificationWorker<R, M> {
    fn clone(&self) -> Self {
        Self {
            simplifier: Arc::clone(&self.simplifier),
        }
    }
}

impl<R, M> SimplificationWorker<R, M>
where
    R: VertexReducer + 'static,
    M: DuplicateMerger + 'static,
{
    pub fn new(simplifier: AdaptiveSimplifier<R, M>) -> Self {
        Self {
            simplifier: Arc::new(simplifier),
        }
    }

    pub fn simplifier(&self) -> &AdaptiveSimplifier<R, M> {
        &self.simplifier
    }

    /// Move `mesh` into a new worker thread
    pub fn submit(&self, mesh: MeshBuffer, config: OptimizationConfig) -> Result<SimplificationTask> {
        let (sender, receiver) = flume::bounded(1);
        let simplifier = Arc::clone(&self.simplifier);

        thread::Builder::new()
            .name("meshslim-simplify".to_string())
            .spawn(move || {
                let mut mesh = mesh;
                let outcome = simplifier.simplify(&mut mesh, &config);
                // The receiver is gone when the task was abandoned
                let _ = sender.send(WorkerOutput { mesh, outcome });
            })?;

        Ok(SimplificationTask { receiver })
    }

    /// Simplify a copy of `mesh` on the worker and write the result back.
    ///
    /// If the worker misses `timeout` or dies, the mesh is left as it was by
    /// that path and a direct fallback pass runs on the calling thread.
    pub fn simplify_offloaded(
        &self,
        mesh: &mut MeshBuffer,
        config: &OptimizationConfig,
        timeout: Duration,
    ) -> SimplificationOutcome {
        let result = self
            .submit(mesh.clone(), config.clone())
            .and_then(|task| task.wait(timeout));

        match result {
            Ok(output) => {
                debug!(
                    vertices = output.mesh.vertex_count(),
                    attempts = output.outcome.attempts,
                    "Worker finished"
                );
                *mesh = output.mesh;
                output.outcome
            }
            Err(e) => {
                warn!(error = %e, "Simplification worker failed, running direct pass");
                self.simplifier.fallback_simplify(mesh, config)
            }
        }
    }
}
