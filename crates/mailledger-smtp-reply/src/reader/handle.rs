//! Single-use reply handles.

use std::io::Read;

use super::ReplyAssembler;
use crate::error::Result;
use crate::transport::Pushback;
use crate::types::LineInfo;

/// Capability to read one reply from a [`ReplyAssembler`].
///
/// A handle is valid while its generation matches the assembler's current
/// one. Issuing the next handle closes this one; reads through a stale handle
/// return nothing.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ReplyHandle {
    generation: u64,
}

impl ReplyHandle {
    pub(crate) const fn new(generation: u64) -> Self {
        Self { generation }
    }

    /// Returns the generation this handle was issued for.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns true if this handle can still read from `assembler`.
    #[must_use]
    pub fn is_current<T>(&self, assembler: &ReplyAssembler<T>) -> bool {
        assembler.is_current(self)
    }

    /// See [`ReplyAssembler::read_line`].
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails or the reply is malformed.
    pub fn read_line<T: Read + Pushback>(
        &self,
        assembler: &mut ReplyAssembler<T>,
    ) -> Result<Option<LineInfo>> {
        assembler.read_line(self)
    }

    /// See [`ReplyAssembler::read_all_lines`].
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails or the reply is malformed.
    pub fn read_all_lines<T: Read + Pushback>(
        &self,
        assembler: &mut ReplyAssembler<T>,
    ) -> Result<Vec<LineInfo>> {
        assembler.read_all_lines(self)
    }

    /// See [`ReplyAssembler::read_raw`].
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails or the reply is malformed.
    pub fn read_raw<T: Read + Pushback>(
        &self,
        assembler: &mut ReplyAssembler<T>,
        buf: &mut [u8],
    ) -> Result<usize> {
        assembler.read_raw(self, buf)
    }

    /// Drains the reply and releases the handle.
    ///
    /// # Errors
    ///
    /// Returns an error if draining the reply fails.
    pub fn close<T: Read + Pushback>(self, assembler: &mut ReplyAssembler<T>) -> Result<()> {
        assembler.close(&self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;
    use crate::transport::PushbackReader;
    use crate::types::ReplyCode;

    #[test]
    fn test_handle_delegates() {
        let input = &b"250-a\r\n250 b\r\n221 bye\r\n"[..];
        let mut asm = ReplyAssembler::new(PushbackReader::new(input));

        let handle = asm.begin_reply().unwrap();
        assert!(handle.is_current(&asm));
        assert_eq!(
            handle.read_line(&mut asm).unwrap(),
            Some(LineInfo::new(ReplyCode::OK, "a"))
        );
        handle.close(&mut asm).unwrap();

        let next = asm.begin_reply().unwrap();
        assert_eq!(
            next.read_all_lines(&mut asm).unwrap(),
            vec![LineInfo::new(ReplyCode::CLOSING, "bye")]
        );
    }

    #[test]
    fn test_generations_increase() {
        let input = &b"250 a\r\n250 b\r\n"[..];
        let mut asm = ReplyAssembler::new(PushbackReader::new(input));
        let first = asm.begin_reply().unwrap();
        let second = asm.begin_reply().unwrap();
        assert!(second.generation() > first.generation());
        assert!(!first.is_current(&asm));

        let mut buf = [0u8; 8];
        assert_eq!(first.read_raw(&mut asm, &mut buf).unwrap(), 0);
    }
}
