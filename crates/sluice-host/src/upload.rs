//! Pull-based script stream → push-based request body adaptation.
//!
//! An outbound streaming upload consumes a script-visible readable
//! stream: the consumer calls "read" and gets a `{done, value}` future.
//! The transport's body writer instead wants a push-style sequence of
//! chunks. [`upload_stream`] bridges the two with a strict
//! single-outstanding-pull invariant: the next pull is issued only
//! after the previous pull's future resolved.
//!
//! Every pull is a full round trip across the engine/native boundary.
//! [`upload_channel`] models that boundary as a bounded(1) handoff pair
//! per direction: the native side sends a demand token and awaits the
//! answer; the engine side receives demand, resolves its own script
//! pull future, and answers. The alternation never busy-waits, and the
//! native consumer never blocks the engine thread on a result the
//! engine itself must produce.
//!
//! There is no cancellation path from an aborted request back into this
//! loop: an abandoned feeder simply sees no more demand.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;
use futures_util::stream;
use sluice_stream::StreamError;
use tokio::sync::mpsc;

use crate::error::HostError;

/// Result of one pull against the script stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pulled {
    /// `{done: false, value}` — one chunk of body bytes.
    Data(Bytes),
    /// `{done: true}` — the script stream ended cleanly.
    Done,
}

/// Boxed future alias for pull results.
pub type PullFuture<'a> = Pin<Box<dyn Future<Output = Result<Pulled, StreamError>> + Send + 'a>>;

/// A lazily pulled chunk sequence — the consumer-driven side of a
/// script-visible readable stream.
///
/// Implementations are injected for testability; production code uses
/// [`ChannelPullSource`] wired to an engine-side [`UploadFeeder`].
pub trait PullSource: Send + 'static {
    /// Request the next chunk. Callers guarantee they never issue a
    /// second pull before the previous future resolved.
    fn pull(&mut self) -> PullFuture<'_>;
}

/// Adapt a pull source into the chunk stream a request body writer
/// expects.
///
/// A source error yields exactly one `Err` ([`HostError::UploadProtocol`])
/// and then the stream ends. `unfold` drives the source strictly
/// sequentially, which is what upholds the single-outstanding-pull
/// invariant.
pub fn upload_stream(
    source: impl PullSource,
) -> impl Stream<Item = Result<Bytes, HostError>> + Send + 'static {
    stream::unfold((source, false), |(mut source, done)| async move {
        if done {
            return None;
        }
        let pulled = source.pull().await;
        match pulled {
            Ok(Pulled::Data(bytes)) => Some((Ok(bytes), (source, false))),
            Ok(Pulled::Done) => None,
            Err(e) => Some((
                Err(HostError::UploadProtocol(e.message().to_string())),
                (source, true),
            )),
        }
    })
}

/// Create a connected native/engine handoff pair for one upload.
///
/// Both directions are bounded(1): at most one demand and one answer
/// are ever in flight.
pub fn upload_channel() -> (ChannelPullSource, UploadFeeder) {
    let (demand_tx, demand_rx) = mpsc::channel(1);
    let (answer_tx, answer_rx) = mpsc::channel(1);
    (
        ChannelPullSource {
            demand_tx,
            answer_rx,
        },
        UploadFeeder {
            demand_rx,
            answer_tx,
        },
    )
}

/// Native-side half: each pull sends one demand token and waits for
/// the engine's answer.
pub struct ChannelPullSource {
    demand_tx: mpsc::Sender<()>,
    answer_rx: mpsc::Receiver<Result<Pulled, StreamError>>,
}

impl PullSource for ChannelPullSource {
    fn pull(&mut self) -> PullFuture<'_> {
        Box::pin(async move {
            if self.demand_tx.send(()).await.is_err() {
                return Err(StreamError::new("upload feeder dropped"));
            }
            match self.answer_rx.recv().await {
                Some(answer) => answer,
                None => Err(StreamError::new("upload feeder dropped")),
            }
        })
    }
}

/// Engine-side half: receives demand, answers once the script stream's
/// own read future resolved.
pub struct UploadFeeder {
    demand_rx: mpsc::Receiver<()>,
    answer_tx: mpsc::Sender<Result<Pulled, StreamError>>,
}

impl UploadFeeder {
    /// Wait for the native side to request the next chunk. Returns
    /// `false` once the upload body was dropped (request finished or
    /// abandoned).
    pub async fn next_demand(&mut self) -> bool {
        self.demand_rx.recv().await.is_some()
    }

    /// Answer the outstanding demand. Returns `false` if the native
    /// side is gone.
    pub async fn answer(&mut self, answer: Result<Pulled, StreamError>) -> bool {
        self.answer_tx.send(answer).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use futures_util::StreamExt;

    /// Pull source that fails the test if a second pull is issued while
    /// one is outstanding.
    struct GuardedSource {
        chunks: Vec<Bytes>,
        in_flight: Arc<AtomicBool>,
        violated: Arc<AtomicBool>,
    }

    impl GuardedSource {
        fn new(chunks: Vec<Bytes>) -> (Self, Arc<AtomicBool>) {
            let violated = Arc::new(AtomicBool::new(false));
            (
                Self {
                    chunks,
                    in_flight: Arc::new(AtomicBool::new(false)),
                    violated: Arc::clone(&violated),
                },
                violated,
            )
        }
    }

    impl PullSource for GuardedSource {
        fn pull(&mut self) -> PullFuture<'_> {
            Box::pin(async move {
                if self.in_flight.swap(true, Ordering::SeqCst) {
                    self.violated.store(true, Ordering::SeqCst);
                    return Err(StreamError::new("concurrent pull"));
                }
                tokio::time::sleep(Duration::from_millis(1)).await;
                self.in_flight.store(false, Ordering::SeqCst);
                if self.chunks.is_empty() {
                    Ok(Pulled::Done)
                } else {
                    Ok(Pulled::Data(self.chunks.remove(0)))
                }
            })
        }
    }

    #[tokio::test]
    async fn yields_chunks_in_pull_order_then_ends() {
        let (source, violated) =
            GuardedSource::new(vec![Bytes::from("one"), Bytes::from("two")]);
        let chunks: Vec<Bytes> = upload_stream(source)
            .map(|r| r.expect("pull should succeed"))
            .collect()
            .await;

        assert_eq!(chunks, vec![Bytes::from("one"), Bytes::from("two")]);
        assert!(!violated.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn never_issues_concurrent_pulls() {
        let chunks: Vec<Bytes> = (0..50).map(|n| Bytes::from(vec![n as u8; 16])).collect();
        let (source, violated) = GuardedSource::new(chunks);

        let total: usize = upload_stream(source)
            .map(|r| r.expect("pull should succeed").len())
            .fold(0, |acc, n| async move { acc + n })
            .await;

        assert_eq!(total, 50 * 16);
        assert!(
            !violated.load(Ordering::SeqCst),
            "a second pull was issued before the prior pull resolved"
        );
    }

    struct FailingSource;

    impl PullSource for FailingSource {
        fn pull(&mut self) -> PullFuture<'_> {
            Box::pin(async { Err(StreamError::new("script stream threw")) })
        }
    }

    #[tokio::test]
    async fn source_error_yields_one_err_then_ends() {
        let mut stream = Box::pin(upload_stream(FailingSource));

        match stream.next().await {
            Some(Err(HostError::UploadProtocol(msg))) => {
                assert!(msg.contains("script stream threw"));
            }
            other => panic!("expected UploadProtocol, got {other:?}"),
        }
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn channel_pair_alternates_demand_and_answer() {
        let (source, mut feeder) = upload_channel();

        // Engine side: feed two chunks then end.
        let engine = tokio::spawn(async move {
            let mut payloads = vec![
                Ok(Pulled::Data(Bytes::from("hello "))),
                Ok(Pulled::Data(Bytes::from("world"))),
                Ok(Pulled::Done),
            ]
            .into_iter();
            while feeder.next_demand().await {
                let Some(answer) = payloads.next() else { break };
                if !feeder.answer(answer).await {
                    break;
                }
            }
        });

        let body: Vec<Bytes> = upload_stream(source)
            .map(|r| r.expect("feeder answered"))
            .collect()
            .await;
        assert_eq!(body, vec![Bytes::from("hello "), Bytes::from("world")]);

        engine.await.expect("engine task panicked");
    }

    #[tokio::test]
    async fn dropped_feeder_surfaces_as_upload_error() {
        let (source, feeder) = upload_channel();
        drop(feeder);

        let mut stream = Box::pin(upload_stream(source));
        match stream.next().await {
            Some(Err(HostError::UploadProtocol(msg))) => {
                assert!(msg.contains("feeder dropped"));
            }
            other => panic!("expected UploadProtocol, got {other:?}"),
        }
    }
}
