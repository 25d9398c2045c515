use bytes::{BufMut, Bytes, BytesMut};
use std::collections::HashMap;

use crate::{buf::TryBuf, error};

use super::{impl_packet_for, VERSION};

/// Implementation for SSH_FXP_VERSION
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    pub version: u32,
    pub extensions: HashMap<String, String>,
}

impl Version {
    pub fn new() -> Self {
        Self {
            version: VERSION,
            extensions: HashMap::new(),
        }
    }
}

impl_packet_for!(Version);

impl Default for Version {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&Version> for Bytes {
    fn from(version: &Version) -> Self {
        let mut bytes = BytesMut::new();
        bytes.put_u32(version.version);
        super::put_extensions(&mut bytes, &version.extensions);
        bytes.freeze()
    }
}

impl TryFrom<&mut Bytes> for Version {
    type Error = error::Error;

    fn try_from(bytes: &mut Bytes) -> Result<Self, Self::Error> {
        Ok(Self {
            version: bytes.get_u32_checked()?,
            extensions: super::get_extensions(bytes)?,
        })
    }
}
