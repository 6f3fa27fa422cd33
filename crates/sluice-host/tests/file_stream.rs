//! Integration tests for the chunked file service.
//!
//! Exercises the full open → chunked read/write → close lifecycle
//! against real temp files, including the exclusive/append open-flag
//! semantics and the EOF-as-marker contract.

use std::sync::Arc;

use bytes::Bytes;
use sluice_host::{FileChunk, FileStreamService, HandleTable, HostError, WriteFlags};

fn service() -> FileStreamService {
    FileStreamService::new(Arc::new(HandleTable::new()), 64 * 1024)
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn chunked_read_walks_file_to_eof() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.bin");
    std::fs::write(&path, b"0123456789").unwrap();

    let svc = service();
    let id = svc.open_read(&path).await.unwrap();

    assert_eq!(
        svc.read_chunk(id, 4).await.unwrap(),
        FileChunk::Data(Bytes::from("0123"))
    );
    assert_eq!(
        svc.read_chunk(id, 4).await.unwrap(),
        FileChunk::Data(Bytes::from("4567"))
    );
    assert_eq!(
        svc.read_chunk(id, 4).await.unwrap(),
        FileChunk::Data(Bytes::from("89"))
    );
    // At end-of-file: the EOF marker, never an error, never an
    // empty-but-more-pending chunk.
    assert_eq!(svc.read_chunk(id, 1024).await.unwrap(), FileChunk::Eof);
    assert_eq!(svc.read_chunk(id, 1024).await.unwrap(), FileChunk::Eof);

    svc.close(id).await;
}

#[tokio::test]
async fn read_after_close_is_eof_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.txt");
    std::fs::write(&path, b"content").unwrap();

    let svc = service();
    let id = svc.open_read(&path).await.unwrap();
    svc.close(id).await;

    assert_eq!(svc.read_chunk(id, 1024).await.unwrap(), FileChunk::Eof);
}

#[tokio::test]
async fn zero_length_request_uses_configured_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.txt");
    std::fs::write(&path, b"abc").unwrap();

    let svc = FileStreamService::new(Arc::new(HandleTable::new()), 2);
    let id = svc.open_read(&path).await.unwrap();

    assert_eq!(
        svc.read_chunk(id, 0).await.unwrap(),
        FileChunk::Data(Bytes::from("ab"))
    );
    svc.close(id).await;
}

#[tokio::test]
async fn open_read_missing_file_rejects_with_os_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.txt");

    let err = service().open_read(&path).await.unwrap_err();
    match err {
        HostError::FileOpen(msg) => assert!(msg.contains("missing.txt"), "{msg}"),
        other => panic!("expected FileOpen, got {other:?}"),
    }
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn write_then_read_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.bin");

    let svc = service();
    let id = svc.open_write(&path, WriteFlags::default()).await.unwrap();
    svc.write_chunk(id, Bytes::from("hello ")).await.unwrap();
    svc.write_chunk(id, Bytes::from("world")).await.unwrap();
    svc.close(id).await;

    assert_eq!(std::fs::read(&path).unwrap(), b"hello world");
}

#[tokio::test]
async fn exclusive_open_of_existing_file_fails_and_leaves_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taken.txt");
    std::fs::write(&path, b"original").unwrap();

    let svc = service();
    let err = svc
        .open_write(
            &path,
            WriteFlags {
                exclusive: true,
                ..WriteFlags::default()
            },
        )
        .await
        .unwrap_err();

    match err {
        HostError::FileOpen(msg) => {
            assert!(msg.contains("already exists"), "{msg}");
        }
        other => panic!("expected FileOpen, got {other:?}"),
    }
    assert_eq!(std::fs::read(&path).unwrap(), b"original");
}

#[tokio::test]
async fn exclusive_open_of_fresh_path_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fresh.txt");

    let svc = service();
    let id = svc
        .open_write(
            &path,
            WriteFlags {
                exclusive: true,
                ..WriteFlags::default()
            },
        )
        .await
        .unwrap();
    svc.write_chunk(id, Bytes::from("new")).await.unwrap();
    svc.close(id).await;

    assert_eq!(std::fs::read(&path).unwrap(), b"new");
}

#[tokio::test]
async fn append_extends_existing_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.txt");
    std::fs::write(&path, b"AB").unwrap();

    let svc = service();
    let id = svc
        .open_write(
            &path,
            WriteFlags {
                append: true,
                ..WriteFlags::default()
            },
        )
        .await
        .unwrap();
    svc.write_chunk(id, Bytes::from("CD")).await.unwrap();
    svc.close(id).await;

    assert_eq!(std::fs::read(&path).unwrap(), b"ABCD");
}

#[tokio::test]
async fn plain_write_mode_truncates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trunc.txt");
    std::fs::write(&path, b"long old contents").unwrap();

    let svc = service();
    let id = svc.open_write(&path, WriteFlags::default()).await.unwrap();
    svc.write_chunk(id, Bytes::from("x")).await.unwrap();
    svc.close(id).await;

    assert_eq!(std::fs::read(&path).unwrap(), b"x");
}

#[tokio::test]
async fn write_after_close_rejects_unknown_handle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gone.txt");

    let svc = service();
    let id = svc.open_write(&path, WriteFlags::default()).await.unwrap();
    svc.close(id).await;

    let err = svc.write_chunk(id, Bytes::from("late")).await.unwrap_err();
    assert!(matches!(err, HostError::UnknownHandle(i) if i == id));
}

// ── Handle sharing ──────────────────────────────────────────────────

#[tokio::test]
async fn handles_are_never_reused_across_open_close_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cycle.txt");
    std::fs::write(&path, b"x").unwrap();

    let svc = service();
    let first = svc.open_read(&path).await.unwrap();
    svc.close(first).await;
    let second = svc.open_read(&path).await.unwrap();

    assert!(second > first);
    // The stale handle stays dead even though a newer one is live.
    assert_eq!(svc.read_chunk(first, 8).await.unwrap(), FileChunk::Eof);
    svc.close(second).await;
}

#[tokio::test]
async fn concurrent_reads_on_independent_handles() {
    let dir = tempfile::tempdir().unwrap();
    let svc = Arc::new(service());

    let mut joins = Vec::new();
    for n in 0..4u8 {
        let path = dir.path().join(format!("f{n}.bin"));
        std::fs::write(&path, vec![n; 4096]).unwrap();
        let svc = Arc::clone(&svc);
        joins.push(tokio::spawn(async move {
            let id = svc.open_read(&path).await.unwrap();
            let mut total = Vec::new();
            loop {
                match svc.read_chunk(id, 1024).await.unwrap() {
                    FileChunk::Data(chunk) => total.extend_from_slice(&chunk),
                    FileChunk::Eof => break,
                }
            }
            svc.close(id).await;
            (n, total)
        }));
    }

    for join in joins {
        let (n, total) = join.await.unwrap();
        assert_eq!(total, vec![n; 4096]);
    }
}
