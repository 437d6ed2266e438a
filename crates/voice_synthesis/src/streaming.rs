//! Streaming synthesis
//!
//! [`AudioStream`] is a pull-based, finite, non-restartable stream of audio
//! chunks. Nothing is produced until the consumer polls, so consumption
//! pacing governs backpressure. Terminal outcomes are reported out of band
//! through [`StreamStatus`]: an error never aborts chunks already delivered,
//! it just ends the stream and marks it failed.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::SpeechError;
use crate::ports::{ChunkStream, StreamingStrategy};
use crate::types::SynthesisRequest;

/// Lifecycle of an [`AudioStream`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamStatus {
    /// Chunks may still arrive
    Streaming,
    /// Every chunk was delivered
    Exhausted,
    /// The stream ended early or never started
    Failed(String),
}

impl StreamStatus {
    /// Whether the stream has reached a terminal state
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Streaming)
    }
}

/// Pull-based stream of synthesized audio chunks
pub struct AudioStream {
    inner: Option<ChunkStream>,
    status: watch::Sender<StreamStatus>,
}

impl std::fmt::Debug for AudioStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioStream")
            .field("open", &self.inner.is_some())
            .field("status", &*self.status.borrow())
            .finish()
    }
}

impl AudioStream {
    /// Wrap an open chunk stream
    #[must_use]
    pub fn new(inner: ChunkStream) -> Self {
        let (status, _) = watch::channel(StreamStatus::Streaming);
        Self {
            inner: Some(inner),
            status,
        }
    }

    /// A stream that yields nothing and is already failed
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        let (status, _) = watch::channel(StreamStatus::Failed(reason.into()));
        Self {
            inner: None,
            status,
        }
    }

    /// Current status
    #[must_use]
    pub fn status(&self) -> StreamStatus {
        self.status.borrow().clone()
    }

    /// Observe the status, including after the stream itself is consumed
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StreamStatus> {
        self.status.subscribe()
    }

    /// Whether the stream failed
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(*self.status.borrow(), StreamStatus::Failed(_))
    }

    /// Drain every remaining chunk into one buffer
    ///
    /// Returns the bytes delivered so far together with the final status.
    pub async fn collect_bytes(mut self) -> (Bytes, StreamStatus) {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.next().await {
            buffer.extend_from_slice(&chunk);
        }
        (buffer.freeze(), self.status())
    }

    fn finish(&mut self, status: StreamStatus) {
        self.inner = None;
        self.status.send_replace(status);
    }
}

impl Stream for AudioStream {
    type Item = Bytes;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            let polled = match self.inner.as_mut() {
                Some(inner) => inner.as_mut().poll_next(cx),
                None => return Poll::Ready(None),
            };

            match polled {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Some(Ok(chunk))) if chunk.is_empty() => {},
                Poll::Ready(Some(Ok(chunk))) => return Poll::Ready(Some(chunk)),
                Poll::Ready(Some(Err(e))) => {
                    warn!("Audio stream interrupted: {e}");
                    self.finish(StreamStatus::Failed(e.to_string()));
                    return Poll::Ready(None);
                },
                Poll::Ready(None) => {
                    debug!("Audio stream exhausted");
                    self.finish(StreamStatus::Exhausted);
                    return Poll::Ready(None);
                },
            }
        }
    }
}

/// Open the first strategy that gets as far as its first chunk
///
/// Setup covers opening the call and pulling the first non-empty chunk.
/// A failure there moves on to the next strategy, which starts from the
/// beginning; attempts are never concatenated. When every strategy fails,
/// the returned stream is already [`StreamStatus::Failed`].
pub async fn open_with_fallback(
    strategies: &[Box<dyn StreamingStrategy>],
    request: &SynthesisRequest,
) -> AudioStream {
    let mut last_error: Option<SpeechError> = None;

    for strategy in strategies {
        debug!("Opening {} stream", strategy.name());

        let mut chunks = match strategy.open(request).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!("{} stream setup failed: {e}", strategy.name());
                last_error = Some(e);
                continue;
            },
        };

        match first_chunk(&mut chunks).await {
            Ok(first) => {
                info!("Streaming audio via {}", strategy.name());
                let replay = stream::once(async move { Ok::<_, SpeechError>(first) });
                return AudioStream::new(replay.chain(chunks).boxed());
            },
            Err(e) => {
                warn!("{} stream produced no audio: {e}", strategy.name());
                last_error = Some(e);
            },
        }
    }

    let reason = last_error.map_or_else(
        || "No streaming path available".to_string(),
        |e| e.to_string(),
    );
    AudioStream::failed(reason)
}

async fn first_chunk(chunks: &mut ChunkStream) -> Result<Bytes, SpeechError> {
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        if !chunk.is_empty() {
            return Ok(chunk);
        }
    }
    Err(SpeechError::NoAudio)
}

/// Re-cut a transport byte stream into blocks of exactly `block_size` bytes
///
/// Only the final block may be shorter. A transport error first flushes the
/// bytes already received, is then yielded once and ends the stream.
pub fn fixed_blocks<S, E>(source: S, block_size: usize) -> ChunkStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<SpeechError> + 'static,
{
    let block_size = block_size.max(1);
    let source: ChunkStream = source.map(|item| item.map_err(Into::into)).boxed();

    stream::unfold(
        (source, BytesMut::new(), false, None::<SpeechError>),
        move |(mut source, mut buffer, mut done, mut failure)| async move {
            loop {
                if buffer.len() >= block_size {
                    let block = buffer.split_to(block_size).freeze();
                    return Some((Ok(block), (source, buffer, done, failure)));
                }

                if done {
                    if !buffer.is_empty() {
                        let rest = buffer.split().freeze();
                        return Some((Ok(rest), (source, buffer, done, failure)));
                    }
                    let e = failure.take()?;
                    return Some((Err(e), (source, buffer, done, failure)));
                }

                match source.next().await {
                    Some(Ok(bytes)) => buffer.extend_from_slice(&bytes),
                    Some(Err(e)) => {
                        failure = Some(e);
                        done = true;
                    },
                    None => done = true,
                }
            }
        },
    )
    .boxed()
}
