//! A small, single-threaded client for Twitch chat (IRCv3 over plain TCP).
//!
//! A [`Session`] owns one non-blocking socket. Each [`Session::tick`] waits
//! on it, reassembles CRLF-terminated lines, parses them into [`Message`]s and
//! hands every message to exactly one callback from [`Events`].

pub mod buffer;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod ircv3;
pub mod message;
pub mod reactor;
pub mod session;
pub mod transport;

pub use dispatch::{CtcpPolicy, Events};
pub use error::{TwircError, TwircResult};
pub use message::{parse_message, Message};
pub use session::{Connection, Session, Status};
pub use transport::IpFamily;
