use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    buf::{PutBuf, TryBuf},
    error,
};

use super::{FileAttributes, FileType};

/// One record of an `SSH_FXP_NAME` reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub filename: String,
    pub longname: String,
    pub attrs: FileAttributes,
}

impl File {
    /// Builds a record with an `ls -l` style longname derived from `attrs`
    pub fn new<T: Into<String>>(filename: T, attrs: FileAttributes) -> Self {
        let mut file = Self {
            filename: filename.into(),
            longname: String::new(),
            attrs,
        };
        file.longname = file.longname();
        file
    }

    fn permission(&self, permission: u32) -> String {
        let read = if (permission >> 2) & 0x1 == 0x1 { "r" } else { "-" };
        let write = if (permission >> 1) & 0x1 == 0x1 { "w" } else { "-" };
        let execute = if permission & 0x1 == 0x1 { "x" } else { "-" };

        format!("{}{}{}", read, write, execute)
    }

    fn permissions(&self) -> String {
        let permissions = self.attrs.permissions.unwrap_or(0);

        let owner = self.permission((permissions >> 6) & 0x7);
        let group = self.permission((permissions >> 3) & 0x7);
        let other = self.permission(permissions & 0x7);

        let kind = match self.attrs.file_type() {
            Some(FileType::DIR) => 'd',
            Some(FileType::LNK) => 'l',
            Some(FileType::CHR) => 'c',
            Some(FileType::BLK) => 'b',
            Some(FileType::FIFO) => 'p',
            Some(FileType::SOCK) => 's',
            _ => '-',
        };

        format!("{}{}{}{}", kind, owner, group, other)
    }

    /// Get formed longname
    pub fn longname(&self) -> String {
        let delayed = self.attrs.modified().format("%b %d %Y %H:%M");

        format!(
            "{} 1 {} {} {} {} {}",
            self.permissions(),
            self.attrs.uid.unwrap_or(0),
            self.attrs.gid.unwrap_or(0),
            self.attrs.len(),
            delayed,
            self.filename
        )
    }
}

impl From<&File> for Bytes {
    fn from(file: &File) -> Self {
        let mut bytes = BytesMut::new();
        bytes.put_str(&file.filename);
        bytes.put_str(&file.longname);
        bytes.put_slice(&Bytes::from(&file.attrs));
        bytes.freeze()
    }
}

impl TryFrom<&mut Bytes> for File {
    type Error = error::Error;

    fn try_from(bytes: &mut Bytes) -> Result<Self, Self::Error> {
        Ok(Self {
            filename: bytes.try_get_lossy_string()?,
            longname: bytes.try_get_lossy_string()?,
            attrs: FileAttributes::try_from(bytes)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longname_for_directory() {
        let file = File::new(
            "dir1",
            FileAttributes {
                size: Some(4096),
                uid: Some(1000),
                gid: Some(100),
                permissions: Some(FileType::DIR.bits() | 0o755),
                atime: Some(0),
                mtime: Some(0),
            },
        );

        assert_eq!(file.longname, "drwxr-xr-x 1 1000 100 4096 Jan 01 1970 00:00 dir1");
    }

    #[test]
    fn non_utf8_filename_is_replaced_not_rejected() {
        let mut bytes = BytesMut::new();
        bytes.put_u32(3);
        bytes.put_slice(b"a\xffb");
        bytes.put_u32(3);
        bytes.put_slice(b"a\xffb");
        bytes.put_u32(0);

        let file = File::try_from(&mut bytes.freeze()).unwrap();
        assert_eq!(file.filename, "a\u{fffd}b");
        assert_eq!(file.attrs, FileAttributes::default());
    }

    #[test]
    fn longname_without_permissions() {
        let file = File::new("blob", FileAttributes::default());
        assert!(file.longname.starts_with("---------- 1 0 0 0 "));
    }
}
