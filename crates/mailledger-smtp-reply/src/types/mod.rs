//! Core SMTP reply types.

mod reply;

pub use reply::{LineInfo, Reply, ReplyCode};
