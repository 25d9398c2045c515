use bytes::Bytes;
use flurry::HashMap;
use std::{
    sync::{
        atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::{mpsc, RwLock},
    time,
};

use super::{error::Error, run, Handler};
use crate::protocol::{Attrs, Handle, Init, Name, Packet, Path, Status, StatusCode, Version};

pub type SftpResult<T> = Result<T, Error>;
type SharedRequests = HashMap<Option<u32>, mpsc::Sender<SftpResult<Packet>>>;

pub(crate) struct SessionInner {
    version: Option<u32>,
    requests: Arc<SharedRequests>,
    closed: Arc<AtomicBool>,
}

impl SessionInner {
    pub async fn reply(&mut self, id: Option<u32>, packet: Packet) -> SftpResult<()> {
        if let Some(sender) = self.requests.pin().remove(&id) {
            let validate = if id.is_some() && self.version.is_none() {
                Err(Error::UnexpectedPacket)
            } else if id.is_none() && self.version.is_some() {
                Err(Error::UnexpectedBehavior("Duplicate version".to_owned()))
            } else {
                Ok(())
            };

            sender
                .try_send(validate.clone().map(|()| packet))
                .map_err(|e| Error::UnexpectedBehavior(e.to_string()))?;

            return validate;
        }

        Err(Error::UnexpectedBehavior(format!(
            "Packet {:?} for unknown recipient",
            id
        )))
    }
}

/// Fails every request still waiting once the read half is gone,
/// instead of leaving them to their timeouts.
impl Drop for SessionInner {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);

        let requests = self.requests.pin();
        for (id, sender) in requests.iter() {
            trace!("failing pending request {:?}", id);
            let _ = sender.try_send(Err(Error::UnexpectedBehavior("session closed".to_owned())));
        }
        requests.clear();
    }
}

#[async_trait]
impl Handler for SessionInner {
    type Error = Error;

    async fn version(&mut self, packet: Version) -> Result<(), Self::Error> {
        let version = packet.version;
        self.reply(None, packet.into()).await?;
        self.version = Some(version);
        Ok(())
    }

    async fn name(&mut self, name: Name) -> Result<(), Self::Error> {
        self.reply(Some(name.id), name.into()).await
    }

    async fn status(&mut self, status: Status) -> Result<(), Self::Error> {
        self.reply(Some(status.id), status.into()).await
    }

    async fn handle(&mut self, handle: Handle) -> Result<(), Self::Error> {
        self.reply(Some(handle.id), Packet::Handle(handle)).await
    }

    async fn attrs(&mut self, attrs: Attrs) -> Result<(), Self::Error> {
        self.reply(Some(attrs.id), attrs.into()).await
    }

    async fn malformed(&mut self, id: Option<u32>, error: Error) -> Result<(), Self::Error> {
        if let Some(sender) = self.requests.pin().remove(&id) {
            let _ = sender.try_send(Err(error));
        }
        Ok(())
    }
}

pub(crate) struct Options {
    timeout: RwLock<u64>,
}

/// Implements raw work with the protocol in request-response format.
/// If the server returns a `Status` packet and it has the code Ok
/// then the packet is returned as Ok in other error cases
/// the packet is stored as Err.
pub struct RawSftpSession {
    tx: mpsc::UnboundedSender<Bytes>,
    requests: Arc<SharedRequests>,
    closed: Arc<AtomicBool>,
    next_req_id: AtomicU32,
    handles: AtomicU64,
    options: Options,
}

macro_rules! into_with_status {
    ($result:ident, $packet:ident) => {
        match $result {
            Packet::$packet(p) => Ok(p),
            Packet::Status(p) => Err(p.into()),
            _ => Err(Error::UnexpectedPacket),
        }
    };
}

macro_rules! into_status {
    ($result:ident) => {
        match $result {
            Packet::Status(status) if status.status_code == StatusCode::Ok => Ok(status),
            Packet::Status(status) => Err(status.into()),
            _ => Err(Error::UnexpectedPacket),
        }
    };
}

impl RawSftpSession {
    pub fn new<S>(stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let req_map = Arc::new(HashMap::new());
        let closed = Arc::new(AtomicBool::new(false));
        let inner = SessionInner {
            version: None,
            requests: req_map.clone(),
            closed: closed.clone(),
        };

        Self {
            tx: run(stream, inner),
            requests: req_map,
            closed,
            next_req_id: AtomicU32::new(1),
            handles: AtomicU64::new(0),
            options: Options {
                timeout: RwLock::new(10),
            },
        }
    }

    /// Set the maximum response time in seconds.
    /// Default: 10 seconds
    pub async fn set_timeout(&self, secs: u64) {
        *self.options.timeout.write().await = secs;
    }

    async fn send(&self, id: Option<u32>, packet: Packet) -> SftpResult<Packet> {
        if self.tx.is_closed() {
            return Err(Error::UnexpectedBehavior("session closed".into()));
        }

        let (tx, mut rx) = mpsc::channel(1);

        let _ = self.requests.pin().insert(id, tx);

        // must follow the insert: shutdown sets the flag before draining the map
        if self.closed.load(Ordering::SeqCst) {
            let _ = self.requests.pin().remove(&id);
            return Err(Error::UnexpectedBehavior("session closed".into()));
        }

        self.tx.send(Bytes::from(&packet))?;

        let timeout = *self.options.timeout.read().await;

        match time::timeout(Duration::from_secs(timeout), rx.recv()).await {
            Ok(Some(result)) => result,
            Ok(None) => {
                let _ = self.requests.pin().remove(&id);
                Err(Error::UnexpectedBehavior("recv none message".into()))
            }
            Err(error) => {
                let _ = self.requests.pin().remove(&id);
                Err(error.into())
            }
        }
    }

    fn use_next_id(&self) -> u32 {
        self.next_req_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Closes the inner channel stream. Called by [`Drop`]
    pub fn close_session(&self) -> SftpResult<()> {
        if self.tx.is_closed() {
            return Ok(());
        }

        Ok(self.tx.send(Bytes::new())?)
    }

    pub async fn init(&self) -> SftpResult<Version> {
        let result = self.send(None, Init::default().into()).await?;
        if let Packet::Version(version) = result {
            Ok(version)
        } else {
            Err(Error::UnexpectedPacket)
        }
    }

    pub async fn opendir<P: Into<String>>(&self, path: P) -> SftpResult<Handle> {
        let id = self.use_next_id();
        let result = self
            .send(
                Some(id),
                Packet::OpenDir(Path {
                    id,
                    path: path.into(),
                }),
            )
            .await?;

        if let Packet::Handle(_) = result {
            let _ = self.handles.fetch_add(1, Ordering::SeqCst);
        }

        into_with_status!(result, Handle)
    }

    pub async fn readdir<H: Into<String>>(&self, handle: H) -> SftpResult<Name> {
        let id = self.use_next_id();
        let result = self
            .send(
                Some(id),
                Packet::ReadDir(Handle {
                    id,
                    handle: handle.into(),
                }),
            )
            .await?;

        into_with_status!(result, Name)
    }

    pub async fn close<H: Into<String>>(&self, handle: H) -> SftpResult<Status> {
        let id = self.use_next_id();
        let result = self
            .send(
                Some(id),
                Packet::Close(Handle {
                    id,
                    handle: handle.into(),
                }),
            )
            .await?;

        if let Packet::Status(status) = &result {
            if status.status_code == StatusCode::Ok
                && self
                    .handles
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |h| h.checked_sub(1))
                    .is_err()
            {
                warn!("attempt to close more handles than exist");
            }
        }

        into_status!(result)
    }

    pub async fn realpath<P: Into<String>>(&self, path: P) -> SftpResult<Name> {
        let id = self.use_next_id();
        let result = self
            .send(
                Some(id),
                Packet::RealPath(Path {
                    id,
                    path: path.into(),
                }),
            )
            .await?;

        into_with_status!(result, Name)
    }

    pub async fn stat<P: Into<String>>(&self, path: P) -> SftpResult<Attrs> {
        let id = self.use_next_id();
        let result = self
            .send(
                Some(id),
                Packet::Stat(Path {
                    id,
                    path: path.into(),
                }),
            )
            .await?;

        into_with_status!(result, Attrs)
    }
}

impl Drop for RawSftpSession {
    fn drop(&mut self) {
        let _ = self.close_session();
    }
}
