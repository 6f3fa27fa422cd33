//! sluice-host — the native side of the Sluice stream bridge.
//!
//! Connects a cooperative, single-threaded script engine to
//! multi-threaded native I/O:
//! - **handles**: thread-safe registry of open native resources keyed by
//!   monotonically increasing IDs
//! - **dispatch**: the channel that marshals every native-thread result
//!   back onto the engine's single execution thread
//! - **fs**: promise-style chunked file reads/writes on background
//!   workers
//! - **net**: pooled HTTP transport returning response heads early and
//!   pumping bodies into sinks from detached tasks
//! - **upload**: pull-based script stream → push-based request body
//!   adaptation
//! - **bridge**: top-level [`IoBridge`] that wires everything together
//!
//! [`IoBridge`]: bridge::IoBridge

pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fs;
pub mod handles;
pub mod net;
pub mod upload;

pub use bridge::IoBridge;
pub use config::HostConfig;
pub use dispatch::{engine_channel, EngineDispatcher, EngineTaskQueue};
pub use error::{HostError, HostResult};
pub use fs::{FileChunk, FileHandle, FileStreamService, WriteFlags};
pub use handles::HandleTable;
pub use net::NetworkStreamExecutor;
pub use upload::{
    upload_channel, upload_stream, ChannelPullSource, PullFuture, PullSource, Pulled, UploadFeeder,
};
