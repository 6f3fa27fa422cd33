use std::time::Duration;

use bytes::Bytes;

use crate::body::{ByteStream, ChunkedBytesStream, EmptyFallibleStream, DEFAULT_CHUNK_SIZE};
use crate::header::HeaderMap;

/// The body attached to an outbound request.
///
/// Streaming upload bodies are not represented here — a lazily pulled
/// source is passed alongside the request on the upload path, because
/// it cannot outlive the engine seam that feeds it.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Fixed(Bytes),
}

impl RequestBody {
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Fixed(bytes) => Some(bytes),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::Empty => true,
            RequestBody::Fixed(bytes) => bytes.is_empty(),
        }
    }
}

/// An abstract outbound HTTP request, before translation into the
/// transport's request type.
///
/// The URL is kept as an unparsed string on purpose: validation happens
/// in the executor so that an invalid URL rejects the initiating future
/// before any native call occurs.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    method: String,
    url: String,
    headers: HeaderMap,
    timeout: Option<Duration>,
    body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: HeaderMap::new(),
            timeout: None,
            body: RequestBody::Empty,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Deadline for the whole request; the executor falls back to its
    /// configured default when unset.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = RequestBody::Fixed(body.into());
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Decompose for translation into a transport request.
    pub fn into_parts(self) -> (String, String, HeaderMap, Option<Duration>, RequestBody) {
        (self.method, self.url, self.headers, self.timeout, self.body)
    }

    /// View a fixed body as a stream of chunks of [`DEFAULT_CHUNK_SIZE`].
    ///
    /// Zero-copy: chunks are `Bytes::slice()`s of the original buffer.
    /// Each call creates an independent stream (cheap refcount bump).
    pub fn body_stream(&self) -> ByteStream {
        self.body_stream_chunked(DEFAULT_CHUNK_SIZE)
    }

    /// Like [`body_stream()`](HttpRequest::body_stream) with a custom chunk size.
    pub fn body_stream_chunked(&self, chunk_size: usize) -> ByteStream {
        match &self.body {
            RequestBody::Fixed(bytes) if !bytes.is_empty() => {
                Box::pin(ChunkedBytesStream::new(bytes.clone(), chunk_size))
            }
            _ => Box::pin(EmptyFallibleStream),
        }
    }
}
