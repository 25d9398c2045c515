use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    buf::{PutBuf, TryBuf},
    error,
};

/// Request body shared by `SSH_FXP_OPENDIR`, `SSH_FXP_REALPATH` and `SSH_FXP_STAT`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub id: u32,
    pub path: String,
}

impl From<&Path> for Bytes {
    fn from(path: &Path) -> Self {
        let mut bytes = BytesMut::new();
        bytes.put_u32(path.id);
        bytes.put_str(&path.path);
        bytes.freeze()
    }
}

impl TryFrom<&mut Bytes> for Path {
    type Error = error::Error;

    fn try_from(bytes: &mut Bytes) -> Result<Self, Self::Error> {
        Ok(Self {
            id: bytes.get_u32_checked()?,
            path: bytes.try_get_string()?,
        })
    }
}
