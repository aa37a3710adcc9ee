//! SMTP reply types.

/// One parsed reply line.
///
/// `text` excludes the status code, the flag byte and the terminating CR LF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineInfo {
    /// Status code found on this line.
    pub code: ReplyCode,
    /// Decoded line text.
    pub text: String,
}

impl LineInfo {
    /// Creates a new line.
    #[must_use]
    pub fn new(code: ReplyCode, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }
}

/// Complete SMTP reply from server.
///
/// Always holds at least one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    lines: Vec<LineInfo>,
}

impl Reply {
    /// Creates a reply from its lines, or `None` if there are none.
    #[must_use]
    pub fn from_lines(lines: Vec<LineInfo>) -> Option<Self> {
        if lines.is_empty() {
            None
        } else {
            Some(Self { lines })
        }
    }

    /// Returns the reply code.
    ///
    /// This is the code of the last line. Lines of one reply are expected to
    /// share a code but this is not checked.
    #[must_use]
    pub fn code(&self) -> ReplyCode {
        self.lines
            .last()
            .map_or(ReplyCode::new(0), |line| line.code)
    }

    /// Returns the reply lines in wire order.
    #[must_use]
    pub fn lines(&self) -> &[LineInfo] {
        &self.lines
    }

    /// Consumes the reply, returning its lines.
    #[must_use]
    pub fn into_lines(self) -> Vec<LineInfo> {
        self.lines
    }

    /// Returns true if this is a success reply (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code().is_success()
    }

    /// Returns true if this is an intermediate reply (3xx).
    #[must_use]
    pub fn is_intermediate(&self) -> bool {
        self.code().is_intermediate()
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub fn is_transient_error(&self) -> bool {
        self.code().is_transient()
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub fn is_permanent_error(&self) -> bool {
        self.code().is_permanent()
    }

    /// Returns the full message as a single string.
    #[must_use]
    pub fn message_text(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// SMTP reply code.
///
/// Built from three ASCII digits; the value is not range-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// Creates a new reply code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns true if this is a success code (2xx).
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub const fn is_transient(self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        self.0 >= 500 && self.0 < 600
    }

    /// Returns true if this is an intermediate reply (3xx).
    #[must_use]
    pub const fn is_intermediate(self) -> bool {
        self.0 >= 300 && self.0 < 400
    }
}

impl From<u16> for ReplyCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

impl std::fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

// Common reply codes
impl ReplyCode {
    /// 220 Service ready
    pub const SERVICE_READY: Self = Self(220);
    /// 221 Service closing transmission channel
    pub const CLOSING: Self = Self(221);
    /// 235 Authentication succeeded
    pub const AUTH_SUCCEEDED: Self = Self(235);
    /// 250 Requested mail action okay, completed
    pub const OK: Self = Self(250);
    /// 251 User not local; will forward
    pub const FORWARD: Self = Self(251);
    /// 334 Continue with authentication
    pub const AUTH_CONTINUE: Self = Self(334);
    /// 354 Start mail input
    pub const START_DATA: Self = Self(354);
    /// 421 Service not available, closing transmission channel
    pub const SERVICE_UNAVAILABLE: Self = Self(421);
    /// 450 Mailbox unavailable (busy)
    pub const MAILBOX_BUSY: Self = Self(450);
    /// 451 Local error in processing
    pub const LOCAL_ERROR: Self = Self(451);
    /// 452 Insufficient system storage
    pub const INSUFFICIENT_STORAGE: Self = Self(452);
    /// 500 Syntax error, command unrecognized
    pub const SYNTAX_ERROR: Self = Self(500);
    /// 501 Syntax error in parameters or arguments
    pub const PARAMETER_ERROR: Self = Self(501);
    /// 502 Command not implemented
    pub const NOT_IMPLEMENTED: Self = Self(502);
    /// 503 Bad sequence of commands
    pub const BAD_SEQUENCE: Self = Self(503);
    /// 535 Authentication credentials invalid
    pub const AUTH_FAILED: Self = Self(535);
    /// 550 Mailbox unavailable (not found, access denied)
    pub const MAILBOX_UNAVAILABLE: Self = Self(550);
    /// 554 Transaction failed
    pub const TRANSACTION_FAILED: Self = Self(554);
}
