//! IoBridge — top-level wiring.
//!
//! Owns the pooled executor, the file service, the shared handle
//! table, and the engine scheduler, and exposes the inbound surface
//! the script-facing glue consumes: issue request (progressive or
//! buffered), issue streaming upload, and the five file operations.
//!
//! Each request gets a fresh sink built over the injected scheduler,
//! so every script-visible result — chunk events, buffered bodies,
//! file results — reaches the engine through the same single channel.

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use sluice_stream::{
    AccumulatingSink, CompletionCallback, EngineScheduler, HttpRequest, ProgressiveSink,
    ResponseHead, StreamEvent,
};

use crate::config::HostConfig;
use crate::error::HostResult;
use crate::fs::{FileChunk, FileHandle, FileStreamService, WriteFlags};
use crate::handles::HandleTable;
use crate::net::NetworkStreamExecutor;
use crate::upload::PullSource;

/// The assembled native I/O host.
pub struct IoBridge {
    executor: NetworkStreamExecutor,
    files: FileStreamService,
    scheduler: Arc<dyn EngineScheduler>,
}

impl IoBridge {
    pub fn new(config: &HostConfig, scheduler: Arc<dyn EngineScheduler>) -> HostResult<Self> {
        let handles: Arc<HandleTable<FileHandle>> = Arc::new(HandleTable::new());
        Ok(Self {
            executor: NetworkStreamExecutor::new(config)?,
            files: FileStreamService::new(handles, config.read_chunk_size),
            scheduler,
        })
    }

    /// Issue a request, streaming the body to `on_event` on the engine
    /// thread as it arrives. Resolves with the head as soon as headers
    /// land.
    pub async fn issue_request(
        &self,
        request: HttpRequest,
        on_event: impl Fn(StreamEvent) + Send + Sync + 'static,
    ) -> HostResult<ResponseHead> {
        let sink = Arc::new(ProgressiveSink::new(Arc::clone(&self.scheduler), on_event));
        self.executor.execute(request, sink).await
    }

    /// Issue a request, buffering the whole body and delivering it to
    /// `on_complete` in one engine-thread callback at the end.
    pub async fn issue_buffered_request(
        &self,
        request: HttpRequest,
        on_complete: CompletionCallback,
    ) -> HostResult<ResponseHead> {
        let sink = Arc::new(AccumulatingSink::new(
            Arc::clone(&self.scheduler),
            on_complete,
        ));
        self.executor.execute(request, sink).await
    }

    /// Issue a streaming upload whose body is pulled lazily from the
    /// script side, streaming the response body to `on_event`.
    pub async fn issue_streaming_upload(
        &self,
        request: HttpRequest,
        source: impl PullSource,
        on_event: impl Fn(StreamEvent) + Send + Sync + 'static,
    ) -> HostResult<ResponseHead> {
        let sink = Arc::new(ProgressiveSink::new(Arc::clone(&self.scheduler), on_event));
        self.executor.execute_upload(request, source, sink).await
    }

    pub async fn open_read(&self, path: impl Into<PathBuf>) -> HostResult<u64> {
        self.files.open_read(path).await
    }

    pub async fn read_chunk(&self, id: u64, len: usize) -> HostResult<FileChunk> {
        self.files.read_chunk(id, len).await
    }

    pub async fn open_write(&self, path: impl Into<PathBuf>, flags: WriteFlags) -> HostResult<u64> {
        self.files.open_write(path, flags).await
    }

    pub async fn write_chunk(&self, id: u64, bytes: Bytes) -> HostResult<()> {
        self.files.write_chunk(id, bytes).await
    }

    pub async fn close(&self, id: u64) {
        self.files.close(id).await
    }
}
