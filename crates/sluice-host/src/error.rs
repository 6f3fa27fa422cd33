//! Host error taxonomy.

use thiserror::Error;

/// Errors surfaced by the native I/O host.
///
/// Failures before any stream or handle is returned reject the
/// initiating future with one of these; failures mid-stream are
/// delivered through the owning sink's `error()` instead. Nothing is
/// auto-retried — retry policy is a caller concern.
#[derive(Debug, Error)]
pub enum HostError {
    /// The request target could not be parsed as a URL. Raised before
    /// any native call occurs.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The transport failed before response headers arrived: DNS, TLS,
    /// connect, or deadline exceeded.
    #[error("transport failure: {0}")]
    Transport(String),

    /// A file could not be opened; carries the OS error string
    /// (including "already exists" under exclusive mode).
    #[error("file open failed: {0}")]
    FileOpen(String),

    /// A mid-stream file syscall failed.
    #[error("file io failed: {0}")]
    FileIo(String),

    /// Write against a handle that is not in the table. Reads translate
    /// this case to EOF and close to a no-op before it is ever raised.
    #[error("unknown file handle {0}")]
    UnknownHandle(u64),

    /// The pull source backing a streaming upload misbehaved or failed.
    #[error("upload protocol error: {0}")]
    UploadProtocol(String),
}

pub type HostResult<T> = Result<T, HostError>;
