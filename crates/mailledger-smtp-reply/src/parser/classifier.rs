//! Byte classifier for the SMTP reply grammar.

use std::fmt;

use crate::error::{Error, Result};

/// Position of the classifier within the reply grammar.
///
/// ```text
/// digit1 digit2 digit3 ('-' | ' ') text CR LF
/// ```
///
/// A `'-'` flag loops back to [`ParseState::AwaitingDigit1`] after the line's
/// CR LF, a `' '` flag leads to [`ParseState::Done`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseState {
    /// Waiting for the hundreds digit of a status code.
    #[default]
    AwaitingDigit1,
    /// Waiting for the tens digit.
    AwaitingDigit2,
    /// Waiting for the units digit.
    AwaitingDigit3,
    /// Waiting for `'-'` (more lines follow) or `' '` (last line).
    AwaitingContinuationFlag,
    /// Inside the text of a continuation line.
    AwaitingLineCr,
    /// Saw CR at the end of a continuation line.
    AwaitingLineLf,
    /// Inside the text of the final line.
    AwaitingFinalCr,
    /// Saw CR at the end of the final line.
    AwaitingFinalLf,
    /// The reply boundary has been reached.
    Done,
}

impl ParseState {
    /// Returns true once the reply boundary has been reached.
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for ParseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::AwaitingDigit1 => "awaiting the first status digit",
            Self::AwaitingDigit2 => "awaiting the second status digit",
            Self::AwaitingDigit3 => "awaiting the third status digit",
            Self::AwaitingContinuationFlag => "awaiting the continuation flag",
            Self::AwaitingLineCr => "reading continuation line text",
            Self::AwaitingFinalCr => "reading final line text",
            Self::AwaitingLineLf | Self::AwaitingFinalLf => "awaiting LF after CR",
            Self::Done => "past the end of the reply",
        };
        f.write_str(text)
    }
}

/// What a single byte meant to the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteClass {
    /// A status code digit, with its numeric value.
    Digit(u8),
    /// The continuation flag; `last` is true for `' '`.
    Flag {
        /// Whether this line closes the reply.
        last: bool,
    },
    /// Line text.
    Text,
    /// The CR ending a line.
    Cr,
    /// The LF ending a continuation line.
    LineEnd,
    /// The LF ending the final line.
    ReplyEnd,
}

/// Advances the grammar by one byte.
///
/// # Errors
///
/// Returns [`Error::Format`] if `byte` is not allowed in `state`.
pub fn step(state: ParseState, byte: u8) -> Result<(ParseState, ByteClass)> {
    let next = match (state, byte) {
        (ParseState::AwaitingDigit1, b'0'..=b'9') => {
            (ParseState::AwaitingDigit2, ByteClass::Digit(byte - b'0'))
        }
        (ParseState::AwaitingDigit2, b'0'..=b'9') => {
            (ParseState::AwaitingDigit3, ByteClass::Digit(byte - b'0'))
        }
        (ParseState::AwaitingDigit3, b'0'..=b'9') => (
            ParseState::AwaitingContinuationFlag,
            ByteClass::Digit(byte - b'0'),
        ),
        (ParseState::AwaitingContinuationFlag, b'-') => {
            (ParseState::AwaitingLineCr, ByteClass::Flag { last: false })
        }
        (ParseState::AwaitingContinuationFlag, b' ') => {
            (ParseState::AwaitingFinalCr, ByteClass::Flag { last: true })
        }
        (ParseState::AwaitingLineCr, b'\r') => (ParseState::AwaitingLineLf, ByteClass::Cr),
        (ParseState::AwaitingLineCr, _) => (ParseState::AwaitingLineCr, ByteClass::Text),
        (ParseState::AwaitingFinalCr, b'\r') => (ParseState::AwaitingFinalLf, ByteClass::Cr),
        (ParseState::AwaitingFinalCr, _) => (ParseState::AwaitingFinalCr, ByteClass::Text),
        (ParseState::AwaitingLineLf, b'\n') => (ParseState::AwaitingDigit1, ByteClass::LineEnd),
        (ParseState::AwaitingFinalLf, b'\n') => (ParseState::Done, ByteClass::ReplyEnd),
        (expected, found) => return Err(Error::Format { expected, found }),
    };
    Ok(next)
}

/// Where a scan should stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Stop after the CR LF of any line.
    Line,
    /// Stop only at the reply boundary.
    Reply,
}

/// Boundary reached by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The end of a continuation line.
    Line,
    /// The end of the reply.
    Reply,
}

/// Outcome of [`Classifier::scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scan {
    /// Number of bytes of the chunk that belong to the current reply.
    pub consumed: usize,
    /// The boundary that stopped the scan, or `None` if the chunk ran out.
    pub boundary: Option<Boundary>,
}

/// Resumable classifier for one reply at a time.
///
/// Holds the [`ParseState`] and the status code of the line being parsed.
/// Chunks may be split at any byte; a scan that runs out of input leaves the
/// state where it stopped so the next chunk continues from there.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    state: ParseState,
    status_code: u16,
}

impl Classifier {
    /// Creates a classifier awaiting the first status digit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current parse state.
    #[must_use]
    pub const fn state(&self) -> ParseState {
        self.state
    }

    /// Returns the status code of the most recently parsed line.
    ///
    /// For multi-line replies this is the code of the last line seen; codes
    /// of earlier lines are not compared against it.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Returns true once the reply boundary has been reached.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.state.is_done()
    }

    /// Prepares for a new reply.
    pub const fn reset(&mut self) {
        self.state = ParseState::AwaitingDigit1;
    }

    /// Classifies `chunk` until a boundary or the end of the chunk.
    ///
    /// Scanning a classifier that is already [`ParseState::Done`] consumes
    /// nothing and reports the reply boundary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] on the first byte that violates the grammar.
    pub fn scan(&mut self, chunk: &[u8], mode: ScanMode) -> Result<Scan> {
        if self.state.is_done() {
            return Ok(Scan {
                consumed: 0,
                boundary: Some(Boundary::Reply),
            });
        }

        for (index, &byte) in chunk.iter().enumerate() {
            let position = self.state;
            let (next, class) = step(position, byte)?;
            self.state = next;

            match class {
                ByteClass::Digit(digit) => self.accumulate(position, digit),
                ByteClass::LineEnd if mode == ScanMode::Line => {
                    return Ok(Scan {
                        consumed: index + 1,
                        boundary: Some(Boundary::Line),
                    });
                }
                ByteClass::ReplyEnd => {
                    return Ok(Scan {
                        consumed: index + 1,
                        boundary: Some(Boundary::Reply),
                    });
                }
                _ => {}
            }
        }

        Ok(Scan {
            consumed: chunk.len(),
            boundary: None,
        })
    }

    fn accumulate(&mut self, position: ParseState, digit: u8) {
        let digit = u16::from(digit);
        match position {
            ParseState::AwaitingDigit1 => self.status_code = 100 * digit,
            ParseState::AwaitingDigit2 => self.status_code += 10 * digit,
            _ => self.status_code += digit,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    fn scan_all(classifier: &mut Classifier, input: &[u8], mode: ScanMode) -> Vec<Scan> {
        let mut scans = Vec::new();
        let mut rest = input;
        loop {
            let scan = classifier.scan(rest, mode).unwrap();
            scans.push(scan);
            rest = &rest[scan.consumed..];
            if rest.is_empty() || scan.boundary == Some(Boundary::Reply) {
                return scans;
            }
        }
    }

    #[test]
    fn test_step_digits() {
        assert_eq!(
            step(ParseState::AwaitingDigit1, b'2').unwrap(),
            (ParseState::AwaitingDigit2, ByteClass::Digit(2))
        );
        assert_eq!(
            step(ParseState::AwaitingDigit3, b'0').unwrap(),
            (ParseState::AwaitingContinuationFlag, ByteClass::Digit(0))
        );
    }

    #[test]
    fn test_step_flags() {
        assert_eq!(
            step(ParseState::AwaitingContinuationFlag, b'-').unwrap(),
            (ParseState::AwaitingLineCr, ByteClass::Flag { last: false })
        );
        assert_eq!(
            step(ParseState::AwaitingContinuationFlag, b' ').unwrap(),
            (ParseState::AwaitingFinalCr, ByteClass::Flag { last: true })
        );
    }

    #[test]
    fn test_step_line_endings() {
        assert_eq!(
            step(ParseState::AwaitingLineLf, b'\n').unwrap(),
            (ParseState::AwaitingDigit1, ByteClass::LineEnd)
        );
        assert_eq!(
            step(ParseState::AwaitingFinalLf, b'\n').unwrap(),
            (ParseState::Done, ByteClass::ReplyEnd)
        );
    }

    #[test]
    fn test_step_bare_lf_is_text() {
        assert_eq!(
            step(ParseState::AwaitingFinalCr, b'\n').unwrap(),
            (ParseState::AwaitingFinalCr, ByteClass::Text)
        );
    }

    #[test]
    fn test_step_rejects() {
        let cases = [
            (ParseState::AwaitingDigit1, b'x'),
            (ParseState::AwaitingDigit2, b' '),
            (ParseState::AwaitingDigit3, b'x'),
            (ParseState::AwaitingContinuationFlag, b'+'),
            (ParseState::AwaitingLineLf, b'x'),
            (ParseState::AwaitingFinalLf, b'\r'),
            (ParseState::Done, b'2'),
        ];
        for (state, byte) in cases {
            match step(state, byte) {
                Err(Error::Format { expected, found }) => {
                    assert_eq!(expected, state);
                    assert_eq!(found, byte);
                }
                other => panic!("expected format error for {state:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_scan_single_line() {
        let mut classifier = Classifier::new();
        let scan = classifier.scan(b"250 OK\r\n", ScanMode::Reply).unwrap();
        assert_eq!(scan.consumed, 8);
        assert_eq!(scan.boundary, Some(Boundary::Reply));
        assert_eq!(classifier.status_code(), 250);
        assert!(classifier.is_done());
    }

    #[test]
    fn test_scan_stops_at_reply_boundary() {
        let mut classifier = Classifier::new();
        let scan = classifier.scan(b"250 OK\r\n221 Bye\r\n", ScanMode::Reply).unwrap();
        assert_eq!(scan.consumed, 8);
        assert_eq!(scan.boundary, Some(Boundary::Reply));
    }

    #[test]
    fn test_scan_line_mode_stops_per_line() {
        let mut classifier = Classifier::new();
        let scans = scan_all(&mut classifier, b"250-a\r\n250-b\r\n250 c\r\n", ScanMode::Line);
        assert_eq!(
            scans,
            vec![
                Scan { consumed: 7, boundary: Some(Boundary::Line) },
                Scan { consumed: 7, boundary: Some(Boundary::Line) },
                Scan { consumed: 7, boundary: Some(Boundary::Reply) },
            ]
        );
    }

    #[test]
    fn test_scan_reply_mode_skips_line_boundaries() {
        let mut classifier = Classifier::new();
        let scan = classifier
            .scan(b"250-a\r\n250-b\r\n250 c\r\n", ScanMode::Reply)
            .unwrap();
        assert_eq!(scan.consumed, 21);
        assert_eq!(scan.boundary, Some(Boundary::Reply));
    }

    #[test]
    fn test_scan_resumes_at_any_split() {
        let input = b"220-first\r\n354 go ahead\r\n";
        for split in 0..input.len() {
            let mut classifier = Classifier::new();
            let first = classifier.scan(&input[..split], ScanMode::Reply).unwrap();
            assert_eq!(first.consumed, split);
            assert_eq!(first.boundary, None);
            let second = classifier.scan(&input[split..], ScanMode::Reply).unwrap();
            assert_eq!(second.consumed, input.len() - split);
            assert_eq!(second.boundary, Some(Boundary::Reply));
            assert_eq!(classifier.status_code(), 354);
        }
    }

    #[test]
    fn test_status_code_is_last_line() {
        let mut classifier = Classifier::new();
        classifier
            .scan(b"220-first\r\n251 last\r\n", ScanMode::Reply)
            .unwrap();
        assert_eq!(classifier.status_code(), 251);
    }

    #[test]
    fn test_scan_done_consumes_nothing() {
        let mut classifier = Classifier::new();
        classifier.scan(b"250 OK\r\n", ScanMode::Reply).unwrap();
        let scan = classifier.scan(b"221 Bye\r\n", ScanMode::Reply).unwrap();
        assert_eq!(scan.consumed, 0);
        assert_eq!(scan.boundary, Some(Boundary::Reply));
    }

    #[test]
    fn test_reset() {
        let mut classifier = Classifier::new();
        classifier.scan(b"250 OK\r\n", ScanMode::Reply).unwrap();
        classifier.reset();
        assert_eq!(classifier.state(), ParseState::AwaitingDigit1);
        let scan = classifier.scan(b"221 Bye\r\n", ScanMode::Reply).unwrap();
        assert_eq!(scan.consumed, 9);
        assert_eq!(classifier.status_code(), 221);
    }

    #[test]
    fn test_scan_rejects_bad_third_digit() {
        let mut classifier = Classifier::new();
        let err = classifier.scan(b"25x OK\r\n", ScanMode::Reply).unwrap_err();
        assert!(matches!(
            err,
            Error::Format { expected: ParseState::AwaitingDigit3, found: b'x' }
        ));
    }

    #[test]
    fn test_scan_rejects_cr_without_lf() {
        let mut classifier = Classifier::new();
        let err = classifier.scan(b"250 OK\rX", ScanMode::Reply).unwrap_err();
        assert!(matches!(
            err,
            Error::Format { expected: ParseState::AwaitingFinalLf, found: b'X' }
        ));
    }

    #[test]
    fn test_scan_empty_chunk() {
        let mut classifier = Classifier::new();
        let scan = classifier.scan(b"", ScanMode::Line).unwrap();
        assert_eq!(scan, Scan { consumed: 0, boundary: None });
        assert_eq!(classifier.state(), ParseState::AwaitingDigit1);
    }
}
