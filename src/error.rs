use std::io;
use thiserror::Error;

use crate::protocol::StatusCode;

/// Errors raised while framing or decoding packets.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O: {0}")]
    IO(String),
    #[error("{0}")]
    Protocol(#[from] StatusCode),
    #[error("Unexpected EOF on stream")]
    UnexpectedEof,
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Self::UnexpectedEof,
            _ => Self::IO(err.to_string()),
        }
    }
}
