use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    buf::{PutBuf, TryBuf},
    error,
};

/// Body of `SSH_FXP_HANDLE` and of the handle-addressed requests
/// `SSH_FXP_READDIR` and `SSH_FXP_CLOSE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handle {
    pub id: u32,
    pub handle: String,
}

impl From<&Handle> for Bytes {
    fn from(handle: &Handle) -> Self {
        let mut bytes = BytesMut::new();
        bytes.put_u32(handle.id);
        bytes.put_str(&handle.handle);
        bytes.freeze()
    }
}

impl TryFrom<&mut Bytes> for Handle {
    type Error = error::Error;

    fn try_from(bytes: &mut Bytes) -> Result<Self, Self::Error> {
        Ok(Self {
            id: bytes.get_u32_checked()?,
            handle: bytes.try_get_string()?,
        })
    }
}
