//! Line accumulation shared by the blocking and async readers.

use crate::error::{Error, Result};
use crate::parser::{Boundary, Classifier, LINE_HEADER_LEN, LINE_TERMINATOR_LEN, ScanMode};
use crate::types::{LineInfo, ReplyCode};

/// Result of feeding one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fed {
    /// Bytes of the chunk that belong to the lines read so far.
    pub consumed: usize,
    /// Whether the requested line or reply is complete.
    pub complete: bool,
}

/// Collects classified bytes into [`LineInfo`] records.
///
/// The status digits and flag of every line are skipped, the remaining bytes
/// are buffered until the line's CR LF and then decoded as UTF-8 with the CR
/// LF stripped.
#[derive(Debug, Default)]
pub(crate) struct LineAccumulator {
    header_read: usize,
    text: Vec<u8>,
    lines: Vec<LineInfo>,
}

impl LineAccumulator {
    /// Feeds `chunk` through `classifier`.
    ///
    /// Stops after the first line if `one_line` is set, otherwise at the
    /// reply boundary. Bytes after the stopping point are left unconsumed.
    pub(crate) fn feed(
        &mut self,
        classifier: &mut Classifier,
        chunk: &[u8],
        one_line: bool,
        max_line_length: usize,
    ) -> Result<Fed> {
        if classifier.is_done() {
            return Ok(Fed {
                consumed: 0,
                complete: true,
            });
        }

        let mut start = 0;
        while start < chunk.len() {
            let scan = classifier.scan(&chunk[start..], ScanMode::Line)?;
            let piece = &chunk[start..start + scan.consumed];
            start += scan.consumed;

            let header = (LINE_HEADER_LEN - self.header_read).min(piece.len());
            self.header_read += header;
            self.text.extend_from_slice(&piece[header..]);
            if self.text.len() > max_line_length + LINE_TERMINATOR_LEN {
                return Err(Error::LineTooLong {
                    limit: max_line_length,
                });
            }

            if let Some(boundary) = scan.boundary {
                self.finish_line(classifier.status_code());
                if one_line || boundary == Boundary::Reply {
                    return Ok(Fed {
                        consumed: start,
                        complete: true,
                    });
                }
            }
        }

        Ok(Fed {
            consumed: start,
            complete: false,
        })
    }

    /// Returns the completed lines, leaving the accumulator empty.
    pub(crate) fn take_lines(&mut self) -> Vec<LineInfo> {
        std::mem::take(&mut self.lines)
    }

    fn finish_line(&mut self, code: u16) {
        let end = self.text.len().saturating_sub(LINE_TERMINATOR_LEN);
        let text = String::from_utf8_lossy(&self.text[..end]).into_owned();
        self.lines.push(LineInfo::new(ReplyCode::new(code), text));
        self.text.clear();
        self.header_read = 0;
    }
}
