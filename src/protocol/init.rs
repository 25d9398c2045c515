use bytes::{BufMut, Bytes, BytesMut};
use std::collections::HashMap;

use crate::{buf::TryBuf, error};

use super::{impl_packet_for, VERSION};

/// Implementation for SSH_FXP_INIT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Init {
    pub version: u32,
    pub extensions: HashMap<String, String>,
}

impl_packet_for!(Init);

impl Init {
    pub fn new() -> Self {
        Self {
            version: VERSION,
            extensions: HashMap::new(),
        }
    }
}

impl Default for Init {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&Init> for Bytes {
    fn from(init: &Init) -> Self {
        let mut bytes = BytesMut::new();
        bytes.put_u32(init.version);
        super::put_extensions(&mut bytes, &init.extensions);
        bytes.freeze()
    }
}

impl TryFrom<&mut Bytes> for Init {
    type Error = error::Error;

    fn try_from(bytes: &mut Bytes) -> Result<Self, Self::Error> {
        Ok(Self {
            version: bytes.get_u32_checked()?,
            extensions: super::get_extensions(bytes)?,
        })
    }
}
