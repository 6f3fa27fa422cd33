//! The engine-thread seam.
//!
//! The script engine runs cooperatively on one logical thread. Every
//! value destined for script visibility must cross back onto that
//! thread — a hard invariant; violating it corrupts engine state.
//! [`EngineScheduler`] is the single seam through which that crossing
//! happens: native-thread code packages the script-visible effect as
//! an [`EngineTask`] and schedules it, never touching engine-owned
//! values itself.
//!
//! The concrete scheduler (a channel into the engine's run loop) lives
//! on the host side; this crate only defines the contract so sinks can
//! be driven against a mock in tests.

/// A deferred unit of work to run on the engine thread.
///
/// Tasks are `Send` because they are constructed on native threads;
/// they capture only plain data (bytes, messages) plus the script
/// callback to invoke.
pub type EngineTask = Box<dyn FnOnce() + Send + 'static>;

/// Marshals tasks onto the script engine's single execution thread.
///
/// Implementations must deliver each task at most once and preserve
/// submission order from any one producer. Scheduling after the engine
/// has shut down is a silent no-op — results arriving during teardown
/// have nowhere meaningful to go.
pub trait EngineScheduler: Send + Sync {
    fn schedule(&self, task: EngineTask);
}
