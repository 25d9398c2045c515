//! In-memory SFTP peer for driving a client session end to end.

use bytes::{BufMut, Bytes, BytesMut};
use sftp_list::protocol::{
    Attrs, File, FileAttributes, FileType, Handle, Name, Packet, Status, StatusCode, Version,
};
use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};

pub const CWD: &str = "/home/sftp";

/// Counters the tests inspect after the session is done
#[derive(Default)]
pub struct Stats {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub readdirs: AtomicUsize,
}

impl Stats {
    pub fn open_handles(&self) -> usize {
        self.opened.load(Ordering::SeqCst) - self.closed.load(Ordering::SeqCst)
    }
}

pub struct FakeServer {
    tree: BTreeMap<String, FileAttributes>,
    batch: usize,
    hang_up_after: Option<usize>,
    fail_close: bool,
    readdir_delay: Option<Duration>,
    cursors: HashMap<String, (Vec<File>, usize)>,
    stats: Arc<Stats>,
}

fn attrs(kind: FileType, mode: u32, size: u64) -> FileAttributes {
    FileAttributes {
        size: Some(size),
        uid: Some(1000),
        gid: Some(1000),
        permissions: Some(kind.bits() | mode),
        atime: Some(1_700_000_000),
        mtime: Some(1_700_000_000),
    }
}

fn parent(path: &str) -> &str {
    match path.rsplit_once('/') {
        Some(("", _)) => "/",
        Some((parent, _)) => parent,
        None => "/",
    }
}

impl FakeServer {
    /// The `list-test` fixture under [`CWD`]
    pub fn new() -> Self {
        let mut server = Self {
            tree: BTreeMap::new(),
            batch: 2,
            hang_up_after: None,
            fail_close: false,
            readdir_delay: None,
            cursors: HashMap::new(),
            stats: Arc::new(Stats::default()),
        };

        for dir in [
            "/",
            "/home",
            CWD,
            "/home/sftp/testServer",
            "/home/sftp/list-test",
            "/home/sftp/list-test/dir1",
            "/home/sftp/list-test/dir2",
            "/home/sftp/list-test/empty",
        ] {
            let _ = server
                .tree
                .insert(dir.to_owned(), attrs(FileType::DIR, 0o755, 4096));
        }

        for (file, size) in [
            ("/home/sftp/testServer/server.log", 12),
            ("/home/sftp/list-test/file1.html", 120),
            ("/home/sftp/list-test/file2.md", 64),
            ("/home/sftp/list-test/test-file1.txt", 33),
            ("/home/sftp/list-test/test-file2.txt.gz", 1024),
        ] {
            let _ = server
                .tree
                .insert(file.to_owned(), attrs(FileType::REG, 0o644, size));
        }

        server
    }

    /// Drops the connection when this many `READDIR` requests have been served
    pub fn hang_up_after(mut self, readdirs: usize) -> Self {
        self.hang_up_after = Some(readdirs);
        self
    }

    /// Answers every `CLOSE` with a failure, after releasing the handle
    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Waits this long before answering each `READDIR`
    pub fn slow_readdir(mut self, delay: Duration) -> Self {
        self.readdir_delay = Some(delay);
        self
    }

    pub fn stats(&self) -> Arc<Stats> {
        self.stats.clone()
    }

    /// Starts serving on one end of an in-memory pipe and returns the other
    pub fn spawn(self) -> DuplexStream {
        let (client, server) = duplex(64 * 1024);
        let _ = tokio::spawn(self.serve(server));
        client
    }

    async fn serve(mut self, mut stream: DuplexStream) {
        loop {
            let Ok(length) = stream.read_u32().await else {
                break;
            };

            let mut buf = vec![0; length as usize];
            if stream.read_exact(&mut buf).await.is_err() {
                break;
            }

            let Ok(request) = Packet::try_from(&mut Bytes::from(buf)) else {
                break;
            };

            if matches!(request, Packet::ReadDir(_))
                && self
                    .hang_up_after
                    .is_some_and(|n| self.stats.readdirs.load(Ordering::SeqCst) >= n)
            {
                break;
            }

            if let (Packet::ReadDir(_), Some(delay)) = (&request, self.readdir_delay) {
                tokio::time::sleep(delay).await;
            }

            let response = self.respond(request);
            if stream.write_all(&Bytes::from(response)).await.is_err() {
                break;
            }
        }
    }

    fn children(&self, dir: &str) -> Vec<File> {
        let mut files = vec![
            File::new(".", self.tree[dir].clone()),
            File::new("..", self.tree[parent(dir)].clone()),
        ];

        // reverse order so the client has to sort
        files.extend(
            self.tree
                .iter()
                .rev()
                .filter(|(path, _)| path.as_str() != "/" && parent(path) == dir)
                .map(|(path, attrs)| {
                    let name = path.rsplit('/').next().unwrap_or_default();
                    File::new(name, attrs.clone())
                }),
        );

        files
    }

    fn respond(&mut self, request: Packet) -> Packet {
        match request {
            Packet::Init(_) => Version::new().into(),
            Packet::RealPath(p) => {
                let path = if p.path == "." { CWD.to_owned() } else { p.path };
                Name {
                    id: p.id,
                    files: vec![File::new(path, FileAttributes::default())],
                }
                .into()
            }
            Packet::Stat(p) => match self.tree.get(&p.path) {
                Some(attrs) => Attrs {
                    id: p.id,
                    attrs: attrs.clone(),
                }
                .into(),
                None => Status::new(p.id, StatusCode::NoSuchFile, "No such file").into(),
            },
            Packet::OpenDir(p) => match self.tree.get(&p.path) {
                None => Status::new(p.id, StatusCode::NoSuchFile, "No such file").into(),
                Some(attrs) if !attrs.is_dir() => {
                    Status::new(p.id, StatusCode::Failure, "Failure").into()
                }
                Some(_) => {
                    let n = self.stats.opened.fetch_add(1, Ordering::SeqCst);
                    let handle = format!("dir-{}", n);
                    let files = self.children(&p.path);
                    let _ = self.cursors.insert(handle.clone(), (files, 0));
                    Packet::Handle(Handle { id: p.id, handle })
                }
            },
            Packet::ReadDir(h) => {
                let _ = self.stats.readdirs.fetch_add(1, Ordering::SeqCst);
                match self.cursors.get_mut(&h.handle) {
                    None => Status::new(h.id, StatusCode::Failure, "Invalid handle").into(),
                    Some((files, offset)) if *offset >= files.len() => {
                        Status::new(h.id, StatusCode::Eof, "End of file").into()
                    }
                    Some((files, offset)) => {
                        let batch: Vec<File> =
                            files.iter().skip(*offset).take(self.batch).cloned().collect();
                        *offset += batch.len();
                        Name {
                            id: h.id,
                            files: batch,
                        }
                        .into()
                    }
                }
            }
            Packet::Close(h) => match self.cursors.remove(&h.handle) {
                Some(_) => {
                    let _ = self.stats.closed.fetch_add(1, Ordering::SeqCst);
                    if self.fail_close {
                        Status::new(h.id, StatusCode::Failure, "Close failed").into()
                    } else {
                        Status::new(h.id, StatusCode::Ok, "Ok").into()
                    }
                }
                None => Status::new(h.id, StatusCode::Failure, "Invalid handle").into(),
            },
            other => Status::new(
                other.request_id().unwrap_or(0),
                StatusCode::OpUnsupported,
                "Unsupported",
            )
            .into(),
        }
    }
}

/// Frames a one-record `SSH_FXP_NAME` by hand, so the name may be any bytes
pub fn raw_name(id: u32, filename: &[u8]) -> Bytes {
    let mut body = BytesMut::new();
    body.put_u8(104);
    body.put_u32(id);
    body.put_u32(1);
    for _ in 0..2 {
        body.put_u32(filename.len() as u32);
        body.put_slice(filename);
    }
    body.put_u32(0);

    let mut framed = BytesMut::new();
    framed.put_u32(body.len() as u32);
    framed.put_slice(&body);
    framed.freeze()
}

/// Peer serving a single directory at [`CWD`] whose first `READDIR` is
/// answered with `first_batch(id)` verbatim and every later one with EOF
pub fn raw_peer<F>(first_batch: F) -> DuplexStream
where
    F: Fn(u32) -> Bytes + Send + 'static,
{
    let (client, mut server) = duplex(64 * 1024);

    let _ = tokio::spawn(async move {
        let mut served = false;

        loop {
            let Ok(length) = server.read_u32().await else {
                break;
            };

            let mut buf = vec![0; length as usize];
            if server.read_exact(&mut buf).await.is_err() {
                break;
            }

            let Ok(request) = Packet::try_from(&mut Bytes::from(buf)) else {
                break;
            };

            let response = match request {
                Packet::Init(_) => Bytes::from(Packet::from(Version::new())),
                Packet::RealPath(p) => Bytes::from(Packet::from(Name {
                    id: p.id,
                    files: vec![File::new(CWD, FileAttributes::default())],
                })),
                Packet::OpenDir(p) => Bytes::from(Packet::Handle(Handle {
                    id: p.id,
                    handle: "raw".to_owned(),
                })),
                Packet::ReadDir(h) if !served => {
                    served = true;
                    first_batch(h.id)
                }
                Packet::ReadDir(h) => Bytes::from(Packet::from(Status::new(
                    h.id,
                    StatusCode::Eof,
                    "End of file",
                ))),
                other => Bytes::from(Packet::from(Status::new(
                    other.request_id().unwrap_or(0),
                    StatusCode::Ok,
                    "Ok",
                ))),
            };

            if server.write_all(&response).await.is_err() {
                break;
            }
        }
    });

    client
}
