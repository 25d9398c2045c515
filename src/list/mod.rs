//! Directory listing on top of a remote session.
//!
//! [`list`] resolves the path against the session's working directory,
//! compiles the filter, reads the directory batch by batch, normalizes the
//! records into [`Entry`] values and returns the matches sorted by name.

mod entry;
mod error;
mod path;
mod pattern;
mod reader;

pub use self::{
    entry::{Entry, EntryType, Rights},
    error::{Error, ListResult},
    path::resolve,
    pattern::{compile, glob_to_regex, Filter, Matcher},
    reader::read_directory,
};

use crate::protocol::File;

/// The part of a remote session a listing needs.
///
/// A handle returned by [`open_dir`](RemoteSession::open_dir) belongs to a
/// single listing and is closed exactly once by it.
#[async_trait]
pub trait RemoteSession: Send + Sync {
    /// Absolute working directory relative paths are resolved against
    fn cwd(&self) -> &str;

    /// Fails with [`Error::NotFound`] or [`Error::NotADirectory`] when the
    /// path cannot be listed, [`Error::Transport`] otherwise
    async fn open_dir(&self, path: &str) -> ListResult<String>;

    /// Next batch of records. An empty batch ends the directory.
    async fn read_dir(&self, handle: &str) -> ListResult<Vec<File>>;

    async fn close_dir(&self, handle: &str) -> ListResult<()>;
}

/// Lists the directory at `path`, keeping entries whose name matches `filter`.
///
/// An empty directory, or one where nothing matches, is an empty `Vec`.
pub async fn list<S>(session: &S, path: &str, filter: Option<&Filter>) -> ListResult<Vec<Entry>>
where
    S: RemoteSession + ?Sized,
{
    let path = resolve(session.cwd(), path);
    let matcher = compile(filter)?;

    let files = read_directory(session, &path).await?;
    let total = files.len();

    let mut entries: Vec<Entry> = files
        .into_iter()
        .map(Entry::from)
        .filter(|entry| matcher.is_match(&entry.name))
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));

    debug!("listed {}: {} of {} entries matched", path, entries.len(), total);
    Ok(entries)
}
