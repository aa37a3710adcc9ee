//! Non-blocking reply reading.
//!
//! [`ReadLines`] is a hand-rolled future so the per-reply accumulator lives
//! on the driver rather than on a call stack. A transport read that is ready
//! immediately is processed within the same `poll` call; only
//! [`Poll::Pending`] yields control, and the transport's waker resumes the
//! loop, possibly on another thread.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tracing::{debug, trace};

use super::lines::LineAccumulator;
use super::{ReplyAssembler, ReplyHandle, check_not_closed, log_failure, scan_raw};
use crate::error::{Error, Result};
use crate::transport::Pushback;
use crate::types::{LineInfo, Reply};

/// Progress of a [`ReadLines`] future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Not polled yet.
    Idle,
    /// Waiting for the transport to deliver a chunk.
    Reading,
    /// Classifying a chunk of `filled` bytes in the read buffer.
    ProcessingChunk {
        /// Number of bytes the transport delivered.
        filled: usize,
    },
    /// The output has been returned.
    Completed,
}

/// Future reading one line or a whole reply.
///
/// Errors are only ever reported through the future's output.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct ReadLines<'a, T> {
    assembler: &'a mut ReplyAssembler<T>,
    readable: bool,
    one_line: bool,
    state: DriverState,
    lines: LineAccumulator,
}

impl<T> ReadLines<'_, T> {
    /// Returns where the driver currently is.
    #[must_use]
    pub const fn state(&self) -> DriverState {
        self.state
    }

    fn complete(&mut self, result: Result<Vec<LineInfo>>) -> Poll<Result<Vec<LineInfo>>> {
        if let Err(err) = &result {
            log_failure(err);
        }
        self.state = DriverState::Completed;
        Poll::Ready(result)
    }
}

impl<T: AsyncRead + Pushback + Unpin> Future for ReadLines<'_, T> {
    type Output = Result<Vec<LineInfo>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        loop {
            match this.state {
                DriverState::Idle => {
                    if !this.readable {
                        return this.complete(Ok(Vec::new()));
                    }
                    this.state = DriverState::Reading;
                }
                DriverState::Reading => {
                    let assembler = &mut *this.assembler;
                    let mut buf = ReadBuf::new(&mut assembler.buffer[..]);
                    let polled = Pin::new(&mut assembler.transport).poll_read(cx, &mut buf);
                    let filled = buf.filled().len();
                    match polled {
                        Poll::Pending => return Poll::Pending,
                        Poll::Ready(Err(err)) => return this.complete(Err(Error::Io(err))),
                        Poll::Ready(Ok(())) => {
                            trace!("Transport delivered {filled} bytes");
                            this.state = DriverState::ProcessingChunk { filled };
                        }
                    }
                }
                DriverState::ProcessingChunk { filled } => {
                    if filled == 0 {
                        return this.complete(Err(Error::connection_closed()));
                    }

                    let assembler = &mut *this.assembler;
                    let fed = this.lines.feed(
                        &mut assembler.classifier,
                        &assembler.buffer[..filled],
                        this.one_line,
                        assembler.config.max_line_length,
                    );
                    match fed {
                        Err(err) => return this.complete(Err(err)),
                        Ok(fed) if fed.complete => {
                            assembler.finish_chunk(fed.consumed, filled);
                            let lines = this.lines.take_lines();
                            return this.complete(Ok(lines));
                        }
                        Ok(_) => this.state = DriverState::Reading,
                    }
                }
                DriverState::Completed => panic!("`ReadLines` polled after completion"),
            }
        }
    }
}

impl<T: AsyncRead + Pushback + Unpin> ReplyAssembler<T> {
    /// Closes the current handle, draining its reply, and issues a new one.
    ///
    /// # Errors
    ///
    /// Returns an error if draining the previous reply fails.
    pub async fn begin_reply_async(&mut self) -> Result<ReplyHandle> {
        if let Some(generation) = self.current {
            self.close_async(&ReplyHandle::new(generation)).await?;
        }
        Ok(self.issue_handle())
    }

    /// Starts reading the next line (`one_line`) or the rest of the reply.
    ///
    /// A stale handle or a finished reply yields an empty result.
    pub fn begin_read_lines(&mut self, handle: &ReplyHandle, one_line: bool) -> ReadLines<'_, T> {
        let readable = self.is_readable(handle);
        ReadLines {
            assembler: self,
            readable,
            one_line,
            state: DriverState::Idle,
            lines: LineAccumulator::default(),
        }
    }

    /// Runs [`Self::begin_read_lines`] and hands the outcome to `on_complete`.
    pub async fn begin_read_lines_with<F, R>(
        &mut self,
        handle: &ReplyHandle,
        one_line: bool,
        on_complete: F,
    ) -> R
    where
        F: FnOnce(Result<Vec<LineInfo>>) -> R,
    {
        let result = self.begin_read_lines(handle, one_line).await;
        on_complete(result)
    }

    /// Async version of [`ReplyAssembler::read_line`].
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails or closes, or if the bytes
    /// violate the reply grammar.
    pub async fn read_line_async(&mut self, handle: &ReplyHandle) -> Result<Option<LineInfo>> {
        Ok(self.begin_read_lines(handle, true).await?.into_iter().next())
    }

    /// Async version of [`ReplyAssembler::read_all_lines`].
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails or closes, or if the bytes
    /// violate the reply grammar.
    pub async fn read_all_lines_async(&mut self, handle: &ReplyHandle) -> Result<Vec<LineInfo>> {
        self.begin_read_lines(handle, false).await
    }

    /// Async version of [`ReplyAssembler::read_reply`].
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails or closes, or if the bytes
    /// violate the reply grammar.
    pub async fn read_reply_async(&mut self, handle: &ReplyHandle) -> Result<Option<Reply>> {
        Ok(Reply::from_lines(self.read_all_lines_async(handle).await?))
    }

    /// Async version of [`ReplyAssembler::read_raw`].
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails or closes, or if the bytes
    /// violate the reply grammar.
    pub async fn read_raw_async(&mut self, handle: &ReplyHandle, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || !self.is_readable(handle) {
            return Ok(0);
        }

        let read = check_not_closed(self.transport.read(buf).await?)?;
        let consumed = scan_raw(&mut self.classifier, &buf[..read])?;
        if consumed < read {
            self.transport.push(&buf[consumed..read]);
        }
        if self.classifier.is_done() {
            debug!("Reply {} complete", self.status_code());
        }
        Ok(consumed)
    }

    /// Async version of [`ReplyAssembler::close`].
    ///
    /// # Errors
    ///
    /// Returns an error if draining fails. The handle is released anyway.
    pub async fn close_async(&mut self, handle: &ReplyHandle) -> Result<()> {
        if !self.is_current(handle) {
            return Ok(());
        }

        let drained = self.drain_async().await;
        self.current = None;
        drained
    }

    async fn drain_async(&mut self) -> Result<()> {
        while !self.classifier.is_done() {
            let filled = check_not_closed(self.transport.read(&mut self.buffer).await?)?;
            let consumed = scan_raw(&mut self.classifier, &self.buffer[..filled])?;
            self.finish_chunk(consumed, filled);
        }
        Ok(())
    }
}
