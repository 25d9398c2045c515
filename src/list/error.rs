use thiserror::Error;

use crate::client;

pub type ListResult<T> = Result<T, Error>;

/// Ways a listing can fail. Each one aborts the whole listing.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The caller's regex or glob does not compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    /// The resolved path does not exist on the remote host
    #[error("No such directory: {0}")]
    NotFound(String),
    /// The resolved path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    /// Connection or protocol fault, including failures part way through a read
    #[error("Transport: {0}")]
    Transport(#[from] client::error::Error),
}
