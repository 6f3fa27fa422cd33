//! Streaming body primitives.
//!
//! Provides the [`ChunkedBytesStream`] adapter that yields a `Bytes` buffer
//! in fixed-size chunks without copying (via `Bytes::slice()`), and
//! minimal stream helpers to avoid pulling in `futures-util` as a
//! runtime dependency.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;

use crate::StreamError;

/// Default chunk size for breaking fixed bodies into stream chunks (64 KB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// A type-erased, fallible async stream of byte chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StreamError>> + Send>>;

/// Yields a `Bytes` buffer in fixed-size chunks without copying.
///
/// Uses `Bytes::slice()` for zero-copy sub-slicing backed by the same
/// reference-counted allocation. At any point, only the current chunk
/// is yielded — no additional buffering beyond the original data.
pub(crate) struct ChunkedBytesStream {
    buf: Bytes,
    chunk_size: usize,
    offset: usize,
}

impl ChunkedBytesStream {
    pub fn new(buf: Bytes, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be > 0");
        Self {
            buf,
            chunk_size,
            offset: 0,
        }
    }
}

impl Stream for ChunkedBytesStream {
    type Item = Result<Bytes, StreamError>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.offset >= this.buf.len() {
            return Poll::Ready(None);
        }
        let end = std::cmp::min(this.offset + this.chunk_size, this.buf.len());
        let chunk = this.buf.slice(this.offset..end);
        this.offset = end;
        Poll::Ready(Some(Ok(chunk)))
    }
}

/// An empty fallible stream that immediately returns `None`.
pub(crate) struct EmptyFallibleStream;

impl Stream for EmptyFallibleStream {
    type Item = Result<Bytes, StreamError>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(None)
    }
}
