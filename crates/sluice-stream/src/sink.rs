//! Push-chunk sink contract and its two consumption styles.
//!
//! A [`StreamSink`] is the destination a native-side producer (response
//! body pump, file reader) pushes byte chunks into. The contract has an
//! at-most-once terminal transition: the first of [`error`] or [`close`]
//! wins, and every later call — including [`enqueue`] — is a silent
//! no-op. Enqueue-after-close drops data; there is no backpressure or
//! cancellation signal back to the producer (documented limitation).
//!
//! Two implementations cover the two consumption styles:
//! - [`AccumulatingSink`] buffers everything and delivers once, at the
//!   terminal transition (buffer-then-deliver)
//! - [`ProgressiveSink`] marshals every chunk to the engine thread as it
//!   arrives (streaming consumption)
//!
//! [`enqueue`]: StreamSink::enqueue
//! [`error`]: StreamSink::error
//! [`close`]: StreamSink::close

use std::sync::{Arc, Mutex, MutexGuard};

use bytes::{Bytes, BytesMut};

use crate::{EngineScheduler, StreamError};

/// Destination for pushed byte chunks with an at-most-once terminal
/// contract.
///
/// Driven from native threads; implementations are responsible for
/// marshaling any engine-visible effect through an [`EngineScheduler`].
pub trait StreamSink: Send + Sync {
    /// Push one chunk. No-op after the sink is closed (the chunk is
    /// dropped).
    fn enqueue(&self, chunk: Bytes);

    /// Terminal failure. First terminal call wins; later calls are
    /// no-ops.
    fn error(&self, err: StreamError);

    /// Terminal clean completion. First terminal call wins; later calls
    /// are no-ops.
    fn close(&self);

    /// Whether a terminal transition has already happened.
    fn is_closed(&self) -> bool;
}

/// One delivery on the progressive path.
///
/// A clean close and an errored close are distinct variants, so call
/// sites never have to infer the terminal kind from payload content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// One body chunk, in producer order.
    Chunk(Bytes),
    /// Clean end of stream. Final event.
    Complete,
    /// Errored end of stream. Final event.
    Failed(String),
}

/// Callback receiving the single buffered result of an accumulating
/// sink, invoked on the engine thread.
pub type CompletionCallback = Box<dyn FnOnce(Result<Bytes, StreamError>) + Send + 'static>;

/// Everything an accumulating sink still owns before its terminal
/// transition. `None` after close/error.
struct Accumulated {
    buf: BytesMut,
    on_complete: CompletionCallback,
}

/// Sink that appends each chunk into one owned buffer and makes no
/// engine-visible callback until the whole operation finishes.
///
/// At the terminal transition the full buffer (or the error) is
/// scheduled onto the engine thread exactly once.
pub struct AccumulatingSink {
    scheduler: Arc<dyn EngineScheduler>,
    state: Mutex<Option<Accumulated>>,
}

impl AccumulatingSink {
    pub fn new(scheduler: Arc<dyn EngineScheduler>, on_complete: CompletionCallback) -> Self {
        Self {
            scheduler,
            state: Mutex::new(Some(Accumulated {
                buf: BytesMut::new(),
                on_complete,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Accumulated>> {
        // A poisoned lock still holds a structurally valid state.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl StreamSink for AccumulatingSink {
    fn enqueue(&self, chunk: Bytes) {
        if let Some(state) = self.lock().as_mut() {
            state.buf.extend_from_slice(&chunk);
        }
    }

    fn error(&self, err: StreamError) {
        if let Some(state) = self.lock().take() {
            let on_complete = state.on_complete;
            self.scheduler.schedule(Box::new(move || on_complete(Err(err))));
        }
    }

    fn close(&self) {
        if let Some(state) = self.lock().take() {
            let body = state.buf.freeze();
            let on_complete = state.on_complete;
            self.scheduler.schedule(Box::new(move || on_complete(Ok(body))));
        }
    }

    fn is_closed(&self) -> bool {
        self.lock().is_none()
    }
}

/// Sink that marshals each chunk, then one terminal event, onto the
/// engine thread as invocations of a caller-supplied callback.
///
/// Exactly one [`StreamEvent::Complete`] or [`StreamEvent::Failed`] is
/// delivered per sink; chunks scheduled before the terminal event keep
/// their enqueue order because the scheduler is order-preserving per
/// producer.
pub struct ProgressiveSink {
    scheduler: Arc<dyn EngineScheduler>,
    on_event: Arc<dyn Fn(StreamEvent) + Send + Sync>,
    closed: Mutex<bool>,
}

impl ProgressiveSink {
    pub fn new(
        scheduler: Arc<dyn EngineScheduler>,
        on_event: impl Fn(StreamEvent) + Send + Sync + 'static,
    ) -> Self {
        Self {
            scheduler,
            on_event: Arc::new(on_event),
            closed: Mutex::new(false),
        }
    }

    fn dispatch(&self, event: StreamEvent) {
        let on_event = Arc::clone(&self.on_event);
        self.scheduler.schedule(Box::new(move || on_event(event)));
    }

    fn lock_closed(&self) -> MutexGuard<'_, bool> {
        match self.closed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

// The `closed` lock is held across `dispatch`, so the scheduler sees
// events in sink-state order: once a terminal event is scheduled, no
// chunk can be scheduled after it from any thread.
impl StreamSink for ProgressiveSink {
    fn enqueue(&self, chunk: Bytes) {
        let closed = self.lock_closed();
        if *closed {
            return;
        }
        self.dispatch(StreamEvent::Chunk(chunk));
    }

    fn error(&self, err: StreamError) {
        let mut closed = self.lock_closed();
        if std::mem::replace(&mut *closed, true) {
            return;
        }
        self.dispatch(StreamEvent::Failed(err.message().to_string()));
    }

    fn close(&self) {
        let mut closed = self.lock_closed();
        if std::mem::replace(&mut *closed, true) {
            return;
        }
        self.dispatch(StreamEvent::Complete);
    }

    fn is_closed(&self) -> bool {
        *self.lock_closed()
    }
}
