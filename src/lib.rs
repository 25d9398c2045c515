//! Remote directory listing over SFTP.
//!
//! ```no_run
//! # async fn run<S>(stream: S) -> Result<(), Box<dyn std::error::Error>>
//! # where S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static {
//! use sftp_list::{client::SftpSession, list::Filter};
//!
//! let sftp = SftpSession::new(stream).await?;
//! for entry in sftp.list("list-test", Some(Filter::from("*txt"))).await? {
//!     println!("{} {} {}", entry.entry_type.tag(), entry.size, entry.name);
//! }
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate log;
#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate async_trait;

mod buf;
/// Client side
pub mod client;
mod error;
/// Listing of remote directories
pub mod list;
/// Protocol implementation
pub mod protocol;
mod utils;

pub use error::Error;
