//! # mailledger-smtp-reply
//!
//! Incremental SMTP reply parsing (RFC 5321 section 4.2) over a byte stream.
//!
//! ## Features
//!
//! - **Chunk-agnostic**: replies may arrive split at any byte, including
//!   inside a status code or a CR LF
//! - **Pushback**: bytes read past a reply boundary go back to the transport,
//!   so the next reply (or a message body) starts exactly where it should
//! - **Single active handle**: each reply is read through a [`ReplyHandle`];
//!   issuing the next one drains and invalidates the previous one
//! - **Blocking and async**: the same reader works over [`std::io::Read`]
//!   and [`tokio::io::AsyncRead`] transports
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailledger_smtp_reply::{PushbackReader, ReplyAssembler};
//! use tokio::net::TcpStream;
//!
//! #[tokio::main]
//! async fn main() -> mailledger_smtp_reply::Result<()> {
//!     let stream = TcpStream::connect("smtp.example.com:25").await?;
//!     let mut replies = ReplyAssembler::new(PushbackReader::new(stream));
//!
//!     // Server greeting
//!     let handle = replies.begin_reply_async().await?;
//!     if let Some(greeting) = replies.read_reply_async(&handle).await? {
//!         println!("{} {}", greeting.code(), greeting.message_text());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Reply Grammar
//!
//! ```text
//! ┌───────┐   ┌───────┐   ┌───────┐   ┌──────┐   ┌──────┐   ┌───────┐
//! │ digit │ → │ digit │ → │ digit │ → │ flag │ → │ text │ → │ CR LF │
//! └───────┘   └───────┘   └───────┘   └──────┘   └──────┘   └───────┘
//!     ↑                                   │ '-'                  │
//!     └───────────────────────────────────┴──────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Reader configuration
//! - [`parser`]: Byte classifier for the reply grammar
//! - [`reader`]: Reply assembler, handles and the async driver
//! - [`transport`]: Pushback transport adapter
//! - [`types`]: Reply codes, lines and replies

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod parser;
pub mod reader;
pub mod transport;
pub mod types;

pub use config::{ReaderConfig, ReaderConfigBuilder};
pub use error::{Error, Result};
pub use parser::{Classifier, ParseState};
pub use reader::{DriverState, ReadLines, ReplyAssembler, ReplyHandle};
pub use transport::{Pushback, PushbackReader};
pub use types::{LineInfo, Reply, ReplyCode};
