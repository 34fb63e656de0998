use thiserror::Error;

use crate::message::ParseError;
use crate::session::{Status, Transition};

#[derive(Error, Debug)]
pub enum TwircError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not resolve {host}:{port} to a usable address")]
    Resolve { host: String, port: u16 },

    #[error("Reactor error: {0}")]
    Reactor(std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Invalid transition {transition:?} from {from:?}")]
    InvalidTransition { from: Status, transition: Transition },

    #[error("Handshake already started (status {0:?})")]
    HandshakeInProgress(Status),

    #[error("Not connected")]
    NotConnected,

    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Receive buffer overflow: {pending} bytes pending, capacity {capacity}")]
    BufferOverflow { pending: usize, capacity: usize },

    #[error("Send would block after {sent} of {len} bytes")]
    SendBlocked { sent: usize, len: usize },
}

pub type TwircResult<T> = Result<T, TwircError>;
