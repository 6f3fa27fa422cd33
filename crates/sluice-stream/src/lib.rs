//! Sluice stream contracts — the types shared between the script-engine
//! glue and the native I/O host.
//!
//! This crate is deliberately I/O-free. It defines:
//! - **sinks**: the push-chunk destination contract ([`StreamSink`]) with
//!   accumulating and progressive implementations
//! - **events**: the tagged [`StreamEvent`] delivered to script callbacks
//!   (`Chunk | Complete | Failed` — terminal states are structurally
//!   distinguishable)
//! - **requests/heads**: [`HttpRequest`] and [`ResponseHead`] with an
//!   ordered header multimap
//! - **the engine seam**: [`EngineScheduler`], the single point through
//!   which every script-visible value crosses back onto the engine's
//!   one logical thread
//!
//! # Threading Model
//!
//! The script engine runs cooperatively on one logical thread; native
//! I/O runs on a multi-threaded pool. Sinks are driven from native
//! threads and marshal engine-visible effects exclusively through an
//! injected [`EngineScheduler`] — native code never touches
//! engine-owned values directly.

pub(crate) mod body;
mod engine;
mod error;
mod header;
mod request;
mod response;
mod sink;

pub use body::{ByteStream, DEFAULT_CHUNK_SIZE};
pub use engine::{EngineScheduler, EngineTask};
pub use error::StreamError;
pub use header::{Header, HeaderMap};
pub use request::{HttpRequest, RequestBody};
pub use response::{HttpVersion, ResponseHead};
pub use sink::{AccumulatingSink, CompletionCallback, ProgressiveSink, StreamEvent, StreamSink};
