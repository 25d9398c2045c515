pub mod error;
mod handler;
pub mod rawsession;
mod session;

pub use handler::Handler;
pub use rawsession::RawSftpSession;
pub use session::SftpSession;

use bytes::Bytes;
use tokio::{
    io::{split, AsyncRead, AsyncWrite, AsyncWriteExt},
    sync::mpsc,
};

use crate::{
    error::Error,
    protocol::{reply_to, Packet},
    utils::read_packet,
};

macro_rules! into_wrap {
    ($handler:expr) => {
        match $handler.await {
            Err(error) => Err(error.into()),
            Ok(()) => Ok(()),
        }
    };
}

async fn execute_handler<H>(bytes: &mut Bytes, handler: &mut H) -> Result<(), error::Error>
where
    H: Handler + Send,
{
    let reply = reply_to(&bytes[..]);

    let packet = match (Packet::try_from(bytes), reply) {
        (Ok(packet), _) => packet,
        // fail the waiting request now rather than at its timeout
        (Err(err), Some(id)) => {
            let err = error::Error::from(err);
            handler.malformed(id, err.clone()).await.map_err(Into::into)?;
            return Err(err);
        }
        (Err(err), None) => return Err(err.into()),
    };

    match packet {
        Packet::Version(p) => into_wrap!(handler.version(p)),
        Packet::Status(p) => into_wrap!(handler.status(p)),
        Packet::Handle(p) => into_wrap!(handler.handle(p)),
        Packet::Name(p) => into_wrap!(handler.name(p)),
        Packet::Attrs(p) => into_wrap!(handler.attrs(p)),
        _ => Err(error::Error::UnexpectedBehavior(
            "A packet was received that could not be processed.".to_owned(),
        )),
    }
}

async fn process_handler<S, H>(stream: &mut S, handler: &mut H) -> Result<(), error::Error>
where
    S: AsyncRead + Unpin,
    H: Handler + Send,
{
    let mut bytes = read_packet(stream).await.map_err(|err| match err {
        Error::UnexpectedEof => error::Error::IO("stream closed".to_owned()),
        err => err.into(),
    })?;
    execute_handler(&mut bytes, handler).await
}

/// Run processing stream as SFTP client. Is a simple handler of incoming
/// and outgoing packets. An empty [`Bytes`] sent through the returned
/// channel shuts the write half down.
pub fn run<S, H>(stream: S, mut handler: H) -> mpsc::UnboundedSender<Bytes>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    H: Handler + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Bytes>();

    let (mut rd, mut wr) = split(stream);
    {
        let _ = tokio::spawn(async move {
            loop {
                match process_handler(&mut rd, &mut handler).await {
                    Err(error::Error::IO(err)) => {
                        debug!("sftp stream read failed: {}", err);
                        break;
                    }
                    Err(err) => warn!("{}", err),
                    Ok(()) => (),
                }
            }

            debug!("read half of sftp stream ended");
        });
    }

    let _ = tokio::spawn(async move {
        while let Some(data) = rx.recv().await {
            if data.is_empty() {
                let _ = wr.shutdown().await;
                break;
            }

            if let Err(err) = wr.write_all(&data[..]).await {
                warn!("sftp stream write failed: {}", err);
                break;
            }
        }

        debug!("write half of sftp stream ended");
    });

    tx
}
