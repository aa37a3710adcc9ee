//! Reply assembly over a pushback-capable transport.
//!
//! A [`ReplyAssembler`] owns the transport for the lifetime of a connection
//! and hands out one [`ReplyHandle`] per reply. Only the most recently issued
//! handle can read; older handles see an empty reply.
//!
//! ```ignore
//! use mailledger_smtp_reply::{PushbackReader, ReplyAssembler};
//!
//! let mut assembler = ReplyAssembler::new(PushbackReader::new(stream));
//! let handle = assembler.begin_reply()?;
//! for line in assembler.read_all_lines(&handle)? {
//!     println!("{} {}", line.code, line.text);
//! }
//! ```

mod driver;
mod handle;
mod lines;

pub use driver::{DriverState, ReadLines};
pub use handle::ReplyHandle;

use std::io::Read;

use tracing::{debug, trace, warn};

use crate::config::ReaderConfig;
use crate::error::{Error, Result};
use crate::parser::{Classifier, ParseState, ScanMode};
use crate::transport::Pushback;
use crate::types::{LineInfo, Reply, ReplyCode};
use lines::LineAccumulator;

/// Splits a transport's byte stream into SMTP replies.
///
/// Not internally synchronized; one consumer per connection.
#[derive(Debug)]
pub struct ReplyAssembler<T> {
    transport: T,
    classifier: Classifier,
    config: ReaderConfig,
    buffer: Box<[u8]>,
    generation: u64,
    current: Option<u64>,
}

impl<T> ReplyAssembler<T> {
    /// Creates an assembler with the default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ReaderConfig::default())
    }

    /// Creates an assembler with an explicit configuration.
    pub fn with_config(transport: T, config: ReaderConfig) -> Self {
        Self {
            transport,
            classifier: Classifier::new(),
            buffer: vec![0; config.buffer_size.max(1)].into_boxed_slice(),
            config,
            generation: 0,
            current: None,
        }
    }

    /// Returns the configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Returns the status code of the most recently parsed line.
    #[must_use]
    pub const fn status_code(&self) -> ReplyCode {
        ReplyCode::new(self.classifier.status_code())
    }

    /// Returns the parse state of the current reply.
    #[must_use]
    pub const fn state(&self) -> ParseState {
        self.classifier.state()
    }

    /// Returns true if `handle` is the one currently allowed to read.
    #[must_use]
    pub fn is_current(&self, handle: &ReplyHandle) -> bool {
        self.current == Some(handle.generation())
    }

    /// Gets a reference to the transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Gets a mutable reference to the transport.
    ///
    /// Reading from it while a reply is in flight desynchronizes the parser.
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consumes the assembler and returns the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Returns true if `handle` may read and its reply is unfinished.
    fn is_readable(&self, handle: &ReplyHandle) -> bool {
        self.is_current(handle) && !self.classifier.is_done()
    }

    /// Issues a handle for the next reply, assuming the previous one is drained.
    fn issue_handle(&mut self) -> ReplyHandle {
        self.classifier.reset();
        self.generation = self.generation.wrapping_add(1);
        self.current = Some(self.generation);
        trace!("Beginning reply {}", self.generation);
        ReplyHandle::new(self.generation)
    }

    /// Pushes back everything in `buffer[consumed..filled]` after a boundary.
    fn finish_chunk(&mut self, consumed: usize, filled: usize)
    where
        T: Pushback,
    {
        if consumed < filled {
            trace!("Pushing back {} bytes past the boundary", filled - consumed);
            self.transport.push(&self.buffer[consumed..filled]);
        }
        if self.classifier.is_done() {
            debug!("Reply {} complete", self.status_code());
        }
    }
}

impl<T: Read + Pushback> ReplyAssembler<T> {
    /// Closes the current handle, draining its reply, and issues a new one.
    ///
    /// # Errors
    ///
    /// Returns an error if draining the previous reply fails.
    pub fn begin_reply(&mut self) -> Result<ReplyHandle> {
        if let Some(generation) = self.current {
            self.close(&ReplyHandle::new(generation))?;
        }
        Ok(self.issue_handle())
    }

    /// Reads raw reply bytes into `buf`, stopping at the reply boundary.
    ///
    /// Returns `Ok(0)` for a stale handle or once the reply is complete.
    /// Bytes read past the boundary are pushed back to the transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails or closes, or if the bytes
    /// violate the reply grammar.
    pub fn read_raw(&mut self, handle: &ReplyHandle, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() || !self.is_readable(handle) {
            return Ok(0);
        }

        let read = self.read_chunk_into(buf)?;
        let scan = scan_raw(&mut self.classifier, &buf[..read])?;
        if scan < read {
            self.transport.push(&buf[scan..read]);
        }
        if self.classifier.is_done() {
            debug!("Reply {} complete", self.status_code());
        }
        Ok(scan)
    }

    /// Reads the next line of the reply.
    ///
    /// Returns `None` for a stale handle or once the reply is complete.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails or closes, or if the bytes
    /// violate the reply grammar.
    pub fn read_line(&mut self, handle: &ReplyHandle) -> Result<Option<LineInfo>> {
        Ok(self.read_lines(handle, true)?.into_iter().next())
    }

    /// Reads every remaining line of the reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails or closes, or if the bytes
    /// violate the reply grammar.
    pub fn read_all_lines(&mut self, handle: &ReplyHandle) -> Result<Vec<LineInfo>> {
        self.read_lines(handle, false)
    }

    /// Reads the remaining lines as a [`Reply`], or `None` if none remain.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails or closes, or if the bytes
    /// violate the reply grammar.
    pub fn read_reply(&mut self, handle: &ReplyHandle) -> Result<Option<Reply>> {
        Ok(Reply::from_lines(self.read_all_lines(handle)?))
    }

    /// Drains the rest of the reply and releases `handle`.
    ///
    /// Closing a stale handle does nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if draining fails. The handle is released anyway.
    pub fn close(&mut self, handle: &ReplyHandle) -> Result<()> {
        if !self.is_current(handle) {
            return Ok(());
        }

        let drained = self.drain();
        self.current = None;
        drained
    }

    fn read_lines(&mut self, handle: &ReplyHandle, one_line: bool) -> Result<Vec<LineInfo>> {
        if !self.is_readable(handle) {
            return Ok(Vec::new());
        }

        let mut lines = LineAccumulator::default();
        loop {
            let filled = self.read_chunk()?;
            let fed = lines
                .feed(
                    &mut self.classifier,
                    &self.buffer[..filled],
                    one_line,
                    self.config.max_line_length,
                )
                .inspect_err(log_failure)?;

            if fed.complete {
                self.finish_chunk(fed.consumed, filled);
                return Ok(lines.take_lines());
            }
        }
    }

    fn drain(&mut self) -> Result<()> {
        if !self.classifier.is_done() {
            debug!("Draining unread reply bytes");
        }
        while !self.classifier.is_done() {
            let filled = self.read_chunk()?;
            let consumed = scan_raw(&mut self.classifier, &self.buffer[..filled])?;
            self.finish_chunk(consumed, filled);
        }
        Ok(())
    }

    /// Reads one chunk into the internal buffer.
    fn read_chunk(&mut self) -> Result<usize> {
        let read = self.transport.read(&mut self.buffer)?;
        check_not_closed(read)
    }

    /// Reads one chunk into a caller buffer.
    fn read_chunk_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        let read = self.transport.read(buf)?;
        check_not_closed(read)
    }
}

/// Classifies a raw chunk up to the reply boundary.
fn scan_raw(classifier: &mut Classifier, chunk: &[u8]) -> Result<usize> {
    let scan = classifier
        .scan(chunk, ScanMode::Reply)
        .inspect_err(log_failure)?;
    trace!("Classified {} of {} raw bytes", scan.consumed, chunk.len());
    Ok(scan.consumed)
}

/// Maps a zero-length read to the connection-closed error.
fn check_not_closed(read: usize) -> Result<usize> {
    if read == 0 {
        let err = Error::connection_closed();
        log_failure(&err);
        return Err(err);
    }
    Ok(read)
}

fn log_failure(err: &Error) {
    warn!("Reply parsing failed: {err}");
}
