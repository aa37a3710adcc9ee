//! SMTP reply grammar.
//!
//! SMTP replies can be single-line or multi-line:
//! - Single: `250 OK\r\n`
//! - Multi: `250-First line\r\n250-Second line\r\n250 Last line\r\n`
//!
//! The [`Classifier`] walks this grammar one byte at a time and can be fed
//! the reply in arbitrarily small chunks. It never performs I/O itself.

mod classifier;

pub use classifier::{Boundary, ByteClass, Classifier, ParseState, Scan, ScanMode, step};

/// Number of bytes before the text of every reply line (3 digits + flag).
pub const LINE_HEADER_LEN: usize = 4;

/// Number of bytes terminating every reply line (CR LF).
pub const LINE_TERMINATOR_LEN: usize = 2;
