use std::sync::Arc;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::Mutex,
};

use super::{error::Error, rawsession::SftpResult, RawSftpSession};
use crate::{
    list::{self, Entry, Filter, ListResult, RemoteSession},
    protocol::{File, FileAttributes, Name, StatusCode},
};

/// High-level SFTP session for listing remote directories.
///
/// Captures the server's working directory at start-up; relative paths given
/// to [`list`](SftpSession::list) are resolved against it. Clones share the
/// same underlying channel.
#[derive(Clone)]
pub struct SftpSession {
    session: Arc<Mutex<RawSftpSession>>,
    cwd: String,
}

impl SftpSession {
    /// Creates a new session by initializing the protocol and asking the
    /// server for the working directory
    pub async fn new<S>(stream: S) -> SftpResult<Self>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let session = RawSftpSession::new(stream);
        let version = session.init().await?;
        debug!("sftp server version {}", version.version);

        let cwd = first_file(session.realpath(".").await?)?;
        debug!("remote working directory {}", cwd);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            cwd,
        })
    }

    /// Set the maximum response time in seconds.
    /// Default: 10 seconds
    pub async fn set_timeout(&self, secs: u64) {
        self.session.lock().await.set_timeout(secs).await;
    }

    /// Closes the inner channel stream.
    pub async fn close(&self) -> SftpResult<()> {
        self.session.lock().await.close_session()
    }

    /// Remote working directory captured when the session was created
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// Requests the remote party for the absolute from the relative path.
    pub async fn canonicalize<T: Into<String>>(&self, path: T) -> SftpResult<String> {
        first_file(self.session.lock().await.realpath(path).await?)
    }

    /// Queries metadata about the remote file.
    pub async fn metadata<P: Into<String>>(&self, path: P) -> SftpResult<FileAttributes> {
        Ok(self.session.lock().await.stat(path).await?.attrs)
    }

    /// Lists the directory at `path`, optionally filtered by name.
    ///
    /// `path` may be absolute, relative to [`cwd`](SftpSession::cwd) or `.`.
    /// The listing runs on its own task, so dropping the returned future does
    /// not interrupt the read loop or leak the directory handle.
    pub async fn list<P: Into<String>>(
        &self,
        path: P,
        filter: Option<Filter>,
    ) -> ListResult<Vec<Entry>> {
        let session = self.clone();
        let path = path.into();

        tokio::spawn(async move { list::list(&session, &path, filter.as_ref()).await })
            .await
            .map_err(|err| Error::UnexpectedBehavior(format!("list task failed: {}", err)))?
    }
}

fn first_file(name: Name) -> SftpResult<String> {
    match name.files.into_iter().next() {
        Some(file) => Ok(file.filename),
        None => Err(Error::UnexpectedBehavior("no file".to_owned())),
    }
}

#[async_trait]
impl RemoteSession for SftpSession {
    fn cwd(&self) -> &str {
        &self.cwd
    }

    async fn open_dir(&self, path: &str) -> ListResult<String> {
        let err = match self.session.lock().await.opendir(path).await {
            Ok(handle) => return Ok(handle.handle),
            Err(err) => err,
        };

        match err.status_code() {
            Some(StatusCode::NoSuchFile) => Err(list::Error::NotFound(path.to_owned())),
            // servers report opendir on a file as a generic failure
            Some(StatusCode::Failure) => match self.metadata(path).await {
                Ok(attrs) if !attrs.is_dir() => Err(list::Error::NotADirectory(path.to_owned())),
                _ => Err(err.into()),
            },
            _ => Err(err.into()),
        }
    }

    async fn read_dir(&self, handle: &str) -> ListResult<Vec<File>> {
        match self.session.lock().await.readdir(handle).await {
            Ok(name) => Ok(name.files),
            Err(err) if err.status_code() == Some(StatusCode::Eof) => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn close_dir(&self, handle: &str) -> ListResult<()> {
        self.session
            .lock()
            .await
            .close(handle)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }
}
