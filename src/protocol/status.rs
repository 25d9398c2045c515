use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::{
    buf::{PutBuf, TryBuf},
    error,
};

use super::impl_packet_for;

/// Error Codes for SSH_FXP_STATUS
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    #[error("Ok")]
    Ok = 0,
    #[error("Eof")]
    Eof = 1,
    #[error("No such file")]
    NoSuchFile = 2,
    #[error("Permission denied")]
    PermissionDenied = 3,
    #[error("Failure")]
    Failure = 4,
    #[error("Bad message")]
    BadMessage = 5,
    #[error("No connection")]
    NoConnection = 6,
    #[error("Connection lost")]
    ConnectionLost = 7,
    #[error("Operation unsupported")]
    OpUnsupported = 8,
}

impl From<u32> for StatusCode {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Ok,
            1 => Self::Eof,
            2 => Self::NoSuchFile,
            3 => Self::PermissionDenied,
            5 => Self::BadMessage,
            6 => Self::NoConnection,
            7 => Self::ConnectionLost,
            8 => Self::OpUnsupported,
            _ => Self::Failure,
        }
    }
}

/// Implementation for SSH_FXP_STATUS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub id: u32,
    pub status_code: StatusCode,
    pub error_message: String,
    pub language_tag: String,
}

impl Status {
    pub fn new(id: u32, status_code: StatusCode, msg: &str) -> Self {
        Self {
            id,
            status_code,
            error_message: msg.to_owned(),
            language_tag: "en-US".to_owned(),
        }
    }
}

impl_packet_for!(Status);

impl From<&Status> for Bytes {
    fn from(status: &Status) -> Self {
        let mut bytes = BytesMut::new();

        bytes.put_u32(status.id);
        bytes.put_u32(status.status_code as u32);
        bytes.put_str(&status.error_message);
        bytes.put_str(&status.language_tag);

        bytes.freeze()
    }
}

impl TryFrom<&mut Bytes> for Status {
    type Error = error::Error;

    fn try_from(bytes: &mut Bytes) -> Result<Self, Self::Error> {
        Ok(Self {
            id: bytes.get_u32_checked()?,
            status_code: StatusCode::from(bytes.get_u32_checked()?),
            error_message: bytes.try_get_string()?,
            language_tag: bytes.try_get_string()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_code_is_failure() {
        assert_eq!(StatusCode::from(4), StatusCode::Failure);
        assert_eq!(StatusCode::from(31), StatusCode::Failure);
        assert_eq!(StatusCode::from(2), StatusCode::NoSuchFile);
    }

    #[test]
    fn status_from_bytes() {
        let status = Status::new(7, StatusCode::Eof, "End of file");
        let mut bytes = Bytes::from(&status);

        let decoded = Status::try_from(&mut bytes).unwrap();
        assert_eq!(decoded, status);
        assert!(bytes.is_empty());
    }
}
