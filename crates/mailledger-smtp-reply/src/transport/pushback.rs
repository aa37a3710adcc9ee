//! Buffered byte source with pushback.

use std::io::{self, Read};
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, ReadBuf};
use tracing::trace;

use super::Pushback;

/// Wraps a byte source and replays pushed-back bytes before reading it.
///
/// Works over blocking [`Read`] sources and [`AsyncRead`] streams alike.
#[derive(Debug)]
pub struct PushbackReader<R> {
    inner: R,
    pending: BytesMut,
}

impl<R> PushbackReader<R> {
    /// Creates a new reader with an empty pushback buffer.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: BytesMut::new(),
        }
    }

    /// Returns the bytes waiting to be replayed.
    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Gets a reference to the underlying source.
    pub const fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Gets a mutable reference to the underlying source.
    ///
    /// Reading from it directly skips any pending bytes.
    pub const fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consumes the reader, returning the source and the pending bytes.
    pub fn into_parts(self) -> (R, BytesMut) {
        (self.inner, self.pending)
    }

    /// Consumes the reader and returns the underlying source.
    ///
    /// Note: Any pending bytes will be lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn replay(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.advance(n);
        n
    }
}

impl<R> Pushback for PushbackReader<R> {
    fn push(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        trace!("Pushing back {} bytes ({} pending)", bytes.len(), self.pending.len());

        if self.pending.is_empty() {
            self.pending.extend_from_slice(bytes);
        } else {
            let mut front = BytesMut::with_capacity(bytes.len() + self.pending.len());
            front.extend_from_slice(bytes);
            front.extend_from_slice(&self.pending);
            self.pending = front;
        }
    }
}

impl<R: Read> Read for PushbackReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() || buf.is_empty() {
            return self.inner.read(buf);
        }
        Ok(self.replay(buf))
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for PushbackReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.pending.is_empty() || buf.remaining() == 0 {
            return Pin::new(&mut this.inner).poll_read(cx, buf);
        }

        let n = buf.remaining().min(this.pending.len());
        buf.put_slice(&this.pending[..n]);
        this.pending.advance(n);
        Poll::Ready(Ok(()))
    }
}
