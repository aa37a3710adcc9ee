//! Error types for SMTP reply parsing.

use std::io;

use crate::parser::ParseState;

/// Result type alias for reply parsing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message carried by the I/O error raised when the peer closes mid-reply.
const CONNECTION_CLOSED: &str = "connection closed";

/// Reply parsing error types.
///
/// Every variant is fatal for the reply being parsed. Once one is returned
/// the parse state can no longer be trusted and the connection should be
/// dropped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error, including the peer closing the connection mid-reply.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A byte violated the reply grammar.
    #[error("Invalid reply format: unexpected byte {found:#04x} while {expected}")]
    Format {
        /// State the classifier was in when the byte arrived.
        expected: ParseState,
        /// The offending byte.
        found: u8,
    },

    /// A single reply line exceeded the configured length limit.
    #[error("Reply line exceeds {limit} bytes")]
    LineTooLong {
        /// Configured maximum line text length.
        limit: usize,
    },
}

impl Error {
    /// Creates the error reported when a read returns zero bytes mid-reply.
    #[must_use]
    pub fn connection_closed() -> Self {
        Self::Io(io::Error::new(io::ErrorKind::UnexpectedEof, CONNECTION_CLOSED))
    }

    /// Returns true if the peer closed the connection before the reply ended.
    #[must_use]
    pub fn is_connection_closed(&self) -> bool {
        matches!(self, Self::Io(err) if err.kind() == io::ErrorKind::UnexpectedEof)
    }

    /// Returns true if this is a grammar violation.
    #[must_use]
    pub const fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}
