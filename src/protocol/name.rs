use bytes::{BufMut, Bytes, BytesMut};

use crate::{buf::TryBuf, error};

use super::{impl_packet_for, File};

/// Implementation for SSH_FXP_NAME
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub id: u32,
    pub files: Vec<File>,
}

impl_packet_for!(Name);

impl From<&Name> for Bytes {
    fn from(name: &Name) -> Self {
        let mut bytes = BytesMut::new();
        bytes.put_u32(name.id);
        bytes.put_u32(name.files.len() as u32);

        for file in &name.files {
            bytes.put_slice(&Bytes::from(file));
        }

        bytes.freeze()
    }
}

impl TryFrom<&mut Bytes> for Name {
    type Error = error::Error;

    fn try_from(bytes: &mut Bytes) -> Result<Self, Self::Error> {
        let id = bytes.get_u32_checked()?;
        let count = bytes.get_u32_checked()?;

        let mut files = Vec::new();
        for _ in 0..count {
            files.push(File::try_from(&mut *bytes)?);
        }

        Ok(Self { id, files })
    }
}
