//! Transport adapter contract.
//!
//! The reply reader pulls bytes through [`std::io::Read`] (blocking) or
//! [`tokio::io::AsyncRead`] (non-blocking) and hands over-read bytes back
//! through [`Pushback`], so the next read sees them first.

mod pushback;

pub use pushback::PushbackReader;

/// A byte source that accepts unconsumed bytes back.
pub trait Pushback {
    /// Returns `bytes` to the front of the source.
    ///
    /// A following read must yield `bytes` before anything buffered earlier
    /// or still unread from the underlying stream.
    fn push(&mut self, bytes: &[u8]);
}

impl<P: Pushback + ?Sized> Pushback for &mut P {
    fn push(&mut self, bytes: &[u8]) {
        (**self).push(bytes);
    }
}

impl<P: Pushback + ?Sized> Pushback for Box<P> {
    fn push(&mut self, bytes: &[u8]) {
        (**self).push(bytes);
    }
}
