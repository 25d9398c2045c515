//! SFTP v3 packets used by directory listing.
//!
//! Every packet encodes and decodes in both directions, so the same types
//! serve the client and any peer that stands in for a server.

mod attrs;
mod file;
mod file_attrs;
mod handle;
mod init;
mod name;
mod path;
mod status;
mod version;

use bytes::{BufMut, Bytes, BytesMut};
use std::collections::HashMap;

use crate::{
    buf::{PutBuf, TryBuf},
    error::Error,
};

pub use self::{
    attrs::Attrs,
    file::File,
    file_attrs::{FileAttr, FileAttributes, FileType, S_IFMT},
    handle::Handle,
    init::Init,
    name::Name,
    path::Path,
    status::{Status, StatusCode},
    version::Version,
};

pub const VERSION: u32 = 3;

const SSH_FXP_INIT: u8 = 1;
const SSH_FXP_VERSION: u8 = 2;
const SSH_FXP_CLOSE: u8 = 4;
const SSH_FXP_OPENDIR: u8 = 11;
const SSH_FXP_READDIR: u8 = 12;
const SSH_FXP_REALPATH: u8 = 16;
const SSH_FXP_STAT: u8 = 17;

const SSH_FXP_STATUS: u8 = 101;
const SSH_FXP_HANDLE: u8 = 102;
const SSH_FXP_NAME: u8 = 104;
const SSH_FXP_ATTRS: u8 = 105;

macro_rules! impl_packet_for {
    ($name:ident) => {
        impl From<$name> for super::Packet {
            fn from(input: $name) -> Self {
                Self::$name(input)
            }
        }
    };
}

pub(crate) use impl_packet_for;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Init(Init),
    Version(Version),
    Close(Handle),
    OpenDir(Path),
    ReadDir(Handle),
    RealPath(Path),
    Stat(Path),
    Status(Status),
    Handle(Handle),
    Name(Name),
    Attrs(Attrs),
}

impl Packet {
    /// Request id carried by the packet. `INIT` and `VERSION` have none.
    pub fn request_id(&self) -> Option<u32> {
        match self {
            Self::Init(_) | Self::Version(_) => None,
            Self::Close(h) | Self::ReadDir(h) | Self::Handle(h) => Some(h.id),
            Self::OpenDir(p) | Self::RealPath(p) | Self::Stat(p) => Some(p.id),
            Self::Status(status) => Some(status.id),
            Self::Name(name) => Some(name.id),
            Self::Attrs(attrs) => Some(attrs.id),
        }
    }
}

/// Request a response answers, read from its header without decoding the
/// body. `Some(None)` is a `VERSION`, which answers the id-less `INIT`.
#[allow(clippy::option_option)]
pub(crate) fn reply_to(bytes: &[u8]) -> Option<Option<u32>> {
    match *bytes {
        [SSH_FXP_VERSION, ..] => Some(None),
        [SSH_FXP_STATUS | SSH_FXP_HANDLE | SSH_FXP_NAME | SSH_FXP_ATTRS, a, b, c, d, ..] => {
            Some(Some(u32::from_be_bytes([a, b, c, d])))
        }
        _ => None,
    }
}

impl TryFrom<&mut Bytes> for Packet {
    type Error = Error;

    fn try_from(bytes: &mut Bytes) -> Result<Self, Self::Error> {
        let r#type = bytes.get_u8_checked()?;
        trace!("packet type {}", r#type);

        let packet = match r#type {
            SSH_FXP_INIT => Self::Init(Init::try_from(bytes)?),
            SSH_FXP_VERSION => Self::Version(Version::try_from(bytes)?),
            SSH_FXP_CLOSE => Self::Close(Handle::try_from(bytes)?),
            SSH_FXP_OPENDIR => Self::OpenDir(Path::try_from(bytes)?),
            SSH_FXP_READDIR => Self::ReadDir(Handle::try_from(bytes)?),
            SSH_FXP_REALPATH => Self::RealPath(Path::try_from(bytes)?),
            SSH_FXP_STAT => Self::Stat(Path::try_from(bytes)?),
            SSH_FXP_STATUS => Self::Status(Status::try_from(bytes)?),
            SSH_FXP_HANDLE => Self::Handle(Handle::try_from(bytes)?),
            SSH_FXP_NAME => Self::Name(Name::try_from(bytes)?),
            SSH_FXP_ATTRS => Self::Attrs(Attrs::try_from(bytes)?),
            _ => return Err(Error::Protocol(StatusCode::OpUnsupported)),
        };

        Ok(packet)
    }
}

/// Frames a packet: u32 length, type byte, payload.
impl From<&Packet> for Bytes {
    fn from(packet: &Packet) -> Self {
        let (r#type, payload): (u8, Bytes) = match packet {
            Packet::Init(init) => (SSH_FXP_INIT, init.into()),
            Packet::Version(version) => (SSH_FXP_VERSION, version.into()),
            Packet::Close(handle) => (SSH_FXP_CLOSE, handle.into()),
            Packet::OpenDir(path) => (SSH_FXP_OPENDIR, path.into()),
            Packet::ReadDir(handle) => (SSH_FXP_READDIR, handle.into()),
            Packet::RealPath(path) => (SSH_FXP_REALPATH, path.into()),
            Packet::Stat(path) => (SSH_FXP_STAT, path.into()),
            Packet::Status(status) => (SSH_FXP_STATUS, status.into()),
            Packet::Handle(handle) => (SSH_FXP_HANDLE, handle.into()),
            Packet::Name(name) => (SSH_FXP_NAME, name.into()),
            Packet::Attrs(attrs) => (SSH_FXP_ATTRS, attrs.into()),
        };

        let length = payload.len() as u32 + 1;

        let mut bytes = BytesMut::new();
        bytes.put_u32(length);
        bytes.put_u8(r#type);
        bytes.put_slice(&payload);
        bytes.freeze()
    }
}

impl From<Packet> for Bytes {
    fn from(packet: Packet) -> Self {
        Self::from(&packet)
    }
}

fn put_extensions(bytes: &mut BytesMut, extensions: &HashMap<String, String>) {
    for (name, data) in extensions {
        bytes.put_str(name);
        bytes.put_str(data);
    }
}

/// Extension pairs run to the end of the packet.
fn get_extensions(bytes: &mut Bytes) -> Result<HashMap<String, String>, Error> {
    let mut extensions = HashMap::new();

    while !bytes.is_empty() {
        let name = bytes.try_get_string()?;
        let data = bytes.try_get_string()?;
        let _ = extensions.insert(name, data);
    }

    Ok(extensions)
}
