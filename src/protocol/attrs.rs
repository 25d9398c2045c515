use bytes::{BufMut, Bytes, BytesMut};

use crate::{buf::TryBuf, error};

use super::{impl_packet_for, FileAttributes};

/// Implementation for SSH_FXP_ATTRS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attrs {
    pub id: u32,
    pub attrs: FileAttributes,
}

impl_packet_for!(Attrs);

impl From<&Attrs> for Bytes {
    fn from(attrs: &Attrs) -> Self {
        let mut bytes = BytesMut::new();
        bytes.put_u32(attrs.id);
        bytes.put_slice(&Bytes::from(&attrs.attrs));
        bytes.freeze()
    }
}

impl TryFrom<&mut Bytes> for Attrs {
    type Error = error::Error;

    fn try_from(bytes: &mut Bytes) -> Result<Self, Self::Error> {
        Ok(Self {
            id: bytes.get_u32_checked()?,
            attrs: FileAttributes::try_from(bytes)?,
        })
    }
}
