//! Engine-thread dispatch.
//!
//! The two execution domains — the engine's single cooperative thread
//! and the native I/O pool — are connected by exactly one channel per
//! direction. This module is the native→engine direction: an unbounded
//! task channel whose receiving half lives inside the engine's run
//! loop. [`EngineDispatcher`] is the cloneable sender given to sinks
//! and services; [`EngineTaskQueue`] is what the (external) run loop
//! drains between script jobs.
//!
//! Submission order is preserved per producer, which is what gives one
//! response's chunks their in-order delivery guarantee. Once the queue
//! is dropped — engine shutdown — scheduling becomes a silent no-op.

use std::sync::Arc;

use sluice_stream::{EngineScheduler, EngineTask};
use tokio::sync::mpsc;

/// Create a connected dispatcher/queue pair.
pub fn engine_channel() -> (Arc<EngineDispatcher>, EngineTaskQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        Arc::new(EngineDispatcher { tx }),
        EngineTaskQueue { rx },
    )
}

/// Sender half: marshals tasks onto the engine thread from any native
/// thread.
#[derive(Clone)]
pub struct EngineDispatcher {
    tx: mpsc::UnboundedSender<EngineTask>,
}

impl EngineScheduler for EngineDispatcher {
    fn schedule(&self, task: EngineTask) {
        if self.tx.send(task).is_err() {
            tracing::debug!("engine task queue dropped; task discarded");
        }
    }
}

/// Receiver half: lives on the engine thread, drained by its run loop.
pub struct EngineTaskQueue {
    rx: mpsc::UnboundedReceiver<EngineTask>,
}

impl EngineTaskQueue {
    /// Run every task currently queued, without waiting for more.
    /// Returns how many ran.
    pub fn run_until_idle(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Wait for the next task and run it. Returns `false` once all
    /// dispatchers are gone and the queue is drained.
    pub async fn run_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }
}
