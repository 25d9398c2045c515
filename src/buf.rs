use std::mem::size_of;

use bytes::{Buf, BufMut};

use crate::{error::Error, protocol::StatusCode};

/// Bounds-checked reads of SFTP primitives. A short buffer is a malformed packet.
///
/// Named apart from `Buf::try_get_*`, which report a different error type.
pub trait TryBuf: Buf {
    fn get_u8_checked(&mut self) -> Result<u8, Error>;
    fn get_u32_checked(&mut self) -> Result<u32, Error>;
    fn get_u64_checked(&mut self) -> Result<u64, Error>;
    fn try_get_bytes(&mut self) -> Result<Vec<u8>, Error>;
    fn try_get_string(&mut self) -> Result<String, Error>;
    /// Like [`try_get_string`](TryBuf::try_get_string) but replaces invalid
    /// UTF-8 instead of failing. Remote file names are arbitrary bytes.
    fn try_get_lossy_string(&mut self) -> Result<String, Error>;
}

impl<T: Buf> TryBuf for T {
    fn get_u8_checked(&mut self) -> Result<u8, Error> {
        if self.remaining() < size_of::<u8>() {
            return Err(Error::Protocol(StatusCode::BadMessage));
        }

        Ok(self.get_u8())
    }

    fn get_u32_checked(&mut self) -> Result<u32, Error> {
        if self.remaining() < size_of::<u32>() {
            return Err(Error::Protocol(StatusCode::BadMessage));
        }

        Ok(self.get_u32())
    }

    fn get_u64_checked(&mut self) -> Result<u64, Error> {
        if self.remaining() < size_of::<u64>() {
            return Err(Error::Protocol(StatusCode::BadMessage));
        }

        Ok(self.get_u64())
    }

    fn try_get_bytes(&mut self) -> Result<Vec<u8>, Error> {
        let len = self.get_u32_checked()? as usize;
        if self.remaining() < len {
            return Err(Error::Protocol(StatusCode::BadMessage));
        }

        Ok(self.copy_to_bytes(len).to_vec())
    }

    fn try_get_string(&mut self) -> Result<String, Error> {
        let bytes = self.try_get_bytes()?;
        String::from_utf8(bytes).map_err(|_| Error::Protocol(StatusCode::BadMessage))
    }

    fn try_get_lossy_string(&mut self) -> Result<String, Error> {
        let bytes = self.try_get_bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

pub trait PutBuf: BufMut {
    fn put_str(&mut self, str: &str);
}

impl<T: BufMut> PutBuf for T {
    fn put_str(&mut self, str: &str) {
        let bytes = str.as_bytes();

        self.put_u32(bytes.len() as u32);
        self.put_slice(bytes);
    }
}

#[cfg(test)]
mod tests {
    use bytes::{Bytes, BytesMut};

    use super::*;

    #[test]
    fn short_buffer_is_bad_message() {
        let mut bytes = Bytes::from_static(&[0, 0, 1]);
        assert!(matches!(
            bytes.get_u32_checked(),
            Err(Error::Protocol(StatusCode::BadMessage))
        ));
    }

    #[test]
    fn string_length_beyond_buffer_is_rejected() {
        let mut bytes = BytesMut::new();
        bytes.put_u32(10);
        bytes.put_slice(b"abc");

        assert!(bytes.freeze().try_get_string().is_err());
    }

    #[test]
    fn lossy_string_keeps_invalid_utf8() {
        let mut bytes = BytesMut::new();
        bytes.put_u32(3);
        bytes.put_slice(b"a\xffb");

        assert!(bytes.clone().freeze().try_get_string().is_err());
        assert_eq!(
            bytes.freeze().try_get_lossy_string().ok().as_deref(),
            Some("a\u{fffd}b")
        );
    }

    #[test]
    fn put_str_prefixes_length() {
        let mut bytes = BytesMut::new();
        bytes.put_str("dir1");

        let mut bytes = bytes.freeze();
        assert_eq!(bytes.len(), 8);
        assert_eq!(bytes.try_get_string().ok().as_deref(), Some("dir1"));
    }
}
