//! Chunked file reads and writes on background workers.
//!
//! Every syscall runs on the blocking worker pool via
//! `tokio::task::spawn_blocking`, never on the engine (or even the
//! calling async) thread, and each result is marshaled back exactly
//! once. Open handles live in an injected [`HandleTable`] as
//! `Arc<Mutex<File>>` — the table lock and the per-file lock are never
//! held at the same time, so no lock-ordering hazard exists.
//!
//! EOF is a distinct marker, not an error: an empty read always means
//! end-of-file, and reading an unknown handle is EOF-equivalent. Close
//! on an unknown handle is a no-op; only writes reject unknown handles
//! explicitly.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use serde::Deserialize;
use tokio::task;

use crate::error::{HostError, HostResult};
use crate::handles::HandleTable;

/// An open file as stored in the handle table.
///
/// The `Arc` is cloned out under the table lock; the inner mutex is
/// then taken on a blocking worker for the actual syscall.
pub type FileHandle = Arc<Mutex<File>>;

/// Result of one chunked read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChunk {
    /// A non-empty run of bytes; more may follow.
    Data(Bytes),
    /// End of file. Never carries bytes.
    Eof,
}

/// Open mode for writes.
///
/// `exclusive` maps to atomic create-fail-if-exists; `append` maps to
/// atomic append-at-EOF. Neither implies truncate — plain write mode
/// (both flags off) creates or truncates.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct WriteFlags {
    #[serde(default)]
    pub append: bool,
    #[serde(default)]
    pub exclusive: bool,
}

/// Promise-style open/read/write/close over real files.
pub struct FileStreamService {
    handles: Arc<HandleTable<FileHandle>>,
    default_read_len: usize,
}

impl FileStreamService {
    pub fn new(handles: Arc<HandleTable<FileHandle>>, default_read_len: usize) -> Self {
        Self {
            handles,
            default_read_len,
        }
    }

    /// Open a file for reading and register it in the table.
    pub async fn open_read(&self, path: impl Into<PathBuf>) -> HostResult<u64> {
        let path = path.into();
        let shown = path.display().to_string();
        let file = task::spawn_blocking(move || OpenOptions::new().read(true).open(&path))
            .await
            .map_err(worker_failure)?
            .map_err(|e| open_failure(&shown, e))?;

        let id = self.handles.allocate(Arc::new(Mutex::new(file)));
        tracing::debug!(handle = id, path = %shown, "opened for read");
        Ok(id)
    }

    /// Open a file for writing per `flags` and register it in the table.
    pub async fn open_write(&self, path: impl Into<PathBuf>, flags: WriteFlags) -> HostResult<u64> {
        let path = path.into();
        let shown = path.display().to_string();
        let file = task::spawn_blocking(move || {
            let mut options = OpenOptions::new();
            options.write(true);
            if flags.exclusive {
                options.create_new(true);
            } else {
                options.create(true);
            }
            if flags.append {
                options.append(true);
            } else if !flags.exclusive {
                options.truncate(true);
            }
            options.open(&path)
        })
        .await
        .map_err(worker_failure)?
        .map_err(|e| open_failure(&shown, e))?;

        let id = self.handles.allocate(Arc::new(Mutex::new(file)));
        tracing::debug!(
            handle = id,
            path = %shown,
            append = flags.append,
            exclusive = flags.exclusive,
            "opened for write"
        );
        Ok(id)
    }

    /// Read up to `len` bytes (the configured default when `len` is 0).
    ///
    /// An unknown handle is EOF-equivalent — reading a closed stream is
    /// not an error, it is simply over.
    pub async fn read_chunk(&self, id: u64, len: usize) -> HostResult<FileChunk> {
        let Some(handle) = self.handles.lookup(id) else {
            tracing::debug!(handle = id, "read on unknown handle; treating as eof");
            return Ok(FileChunk::Eof);
        };

        let len = if len == 0 { self.default_read_len } else { len };
        let chunk = task::spawn_blocking(move || -> HostResult<FileChunk> {
            let mut file = handle
                .lock()
                .map_err(|_| HostError::FileIo("file handle lock poisoned".to_string()))?;
            let mut buf = vec![0u8; len];
            let n = file
                .read(&mut buf)
                .map_err(|e| HostError::FileIo(e.to_string()))?;
            if n == 0 {
                return Ok(FileChunk::Eof);
            }
            buf.truncate(n);
            Ok(FileChunk::Data(Bytes::from(buf)))
        })
        .await
        .map_err(worker_failure)??;

        Ok(chunk)
    }

    /// Write one chunk fully. Unknown handles are an explicit rejection.
    pub async fn write_chunk(&self, id: u64, bytes: Bytes) -> HostResult<()> {
        let Some(handle) = self.handles.lookup(id) else {
            return Err(HostError::UnknownHandle(id));
        };

        task::spawn_blocking(move || -> HostResult<()> {
            let mut file = handle
                .lock()
                .map_err(|_| HostError::FileIo("file handle lock poisoned".to_string()))?;
            file.write_all(&bytes)
                .map_err(|e| HostError::FileIo(e.to_string()))
        })
        .await
        .map_err(worker_failure)??;

        Ok(())
    }

    /// Remove the handle and close the file. No-op on an unknown ID.
    pub async fn close(&self, id: u64) {
        if let Some(handle) = self.handles.remove(id) {
            // The close(2) happens when the last Arc drops; push that
            // onto a worker in case this clone is the last one.
            let _ = task::spawn_blocking(move || drop(handle)).await;
            tracing::debug!(handle = id, "closed");
        } else {
            tracing::debug!(handle = id, "close on unknown handle; no-op");
        }
    }
}

fn worker_failure(e: task::JoinError) -> HostError {
    HostError::FileIo(format!("file worker failed: {e}"))
}

/// Exclusive-open collisions must say "already exists"; the OS errno
/// text (`File exists` on Linux) is kept for diagnostics.
fn open_failure(path: &str, e: std::io::Error) -> HostError {
    if e.kind() == std::io::ErrorKind::AlreadyExists {
        HostError::FileOpen(format!("{path}: already exists ({e})"))
    } else {
        HostError::FileOpen(format!("{path}: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> FileStreamService {
        FileStreamService::new(Arc::new(HandleTable::new()), 64 * 1024)
    }

    #[tokio::test]
    async fn read_unknown_handle_is_eof() {
        let svc = service();
        assert_eq!(svc.read_chunk(999, 1024).await.unwrap(), FileChunk::Eof);
    }

    #[tokio::test]
    async fn write_unknown_handle_is_rejected() {
        let svc = service();
        let err = svc.write_chunk(999, Bytes::from("x")).await.unwrap_err();
        assert!(matches!(err, HostError::UnknownHandle(999)));
    }

    #[tokio::test]
    async fn close_unknown_handle_is_noop() {
        let svc = service();
        svc.close(999).await;
    }

    #[test]
    fn write_flags_parse_from_script_json() {
        let flags: WriteFlags = serde_json::from_str(r#"{"append": true}"#).unwrap();
        assert!(flags.append);
        assert!(!flags.exclusive);

        let flags: WriteFlags = serde_json::from_str("{}").unwrap();
        assert!(!flags.append);
        assert!(!flags.exclusive);
    }

    #[test]
    fn exclusive_collision_message_names_already_exists() {
        let err = open_failure(
            "/tmp/taken.txt",
            std::io::Error::from(std::io::ErrorKind::AlreadyExists),
        );
        match err {
            HostError::FileOpen(msg) => {
                assert!(msg.contains("/tmp/taken.txt"), "{msg}");
                assert!(msg.contains("already exists"), "{msg}");
            }
            other => panic!("expected FileOpen, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn open_read_missing_file_carries_os_error() {
        let svc = service();
        let err = svc
            .open_read("/definitely/not/a/real/path")
            .await
            .unwrap_err();
        match err {
            HostError::FileOpen(msg) => {
                assert!(msg.contains("/definitely/not/a/real/path"), "{msg}");
            }
            other => panic!("expected FileOpen, got {other:?}"),
        }
    }
}
