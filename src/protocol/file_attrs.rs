use bytes::{BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};

use crate::{buf::TryBuf, error};

/// Attributes flags according to the specification
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileAttr(u32);

/// Types according to mode unix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileType(u32);

bitflags! {
    impl FileAttr: u32 {
        const SIZE = 0x00000001;
        const UIDGID = 0x00000002;
        const PERMISSIONS = 0x00000004;
        const ACMODTIME = 0x00000008;
        const EXTENDED = 0x80000000;
    }

    impl FileType: u32 {
        const FIFO = 0o010000;
        const CHR = 0o020000;
        const DIR = 0o040000;
        const BLK = 0o060000;
        const REG = 0o100000;
        const LNK = 0o120000;
        const SOCK = 0o140000;
    }
}

/// Mask selecting the file type bits of a unix mode
pub const S_IFMT: u32 = 0o170000;

impl FileType {
    /// Extracts the type from a full unix mode. The type bits overlap
    /// (`BLK` is `DIR | CHR`), so only an exact match counts.
    pub fn from_mode(mode: u32) -> Option<Self> {
        let kind = Self::from_bits_retain(mode & S_IFMT);
        [
            Self::FIFO,
            Self::CHR,
            Self::DIR,
            Self::BLK,
            Self::REG,
            Self::LNK,
            Self::SOCK,
        ]
        .into_iter()
        .find(|t| *t == kind)
    }
}

/// File attributes as carried by `SSH_FXP_NAME` and `SSH_FXP_ATTRS`.
///
/// Every field is optional on the wire; the presence flags are derived
/// from which fields are set when encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileAttributes {
    pub size: Option<u64>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub permissions: Option<u32>,
    pub atime: Option<u32>,
    pub mtime: Option<u32>,
}

macro_rules! impl_fn_type {
    ($get_name:ident, $doc_name:expr, $flag:ident) => {
        #[doc = "Returns `true` if is a "]
        #[doc = $doc_name]
        pub fn $get_name(&self) -> bool {
            self.file_type() == Some(FileType::$flag)
        }
    };
}

impl FileAttributes {
    impl_fn_type!(is_dir, "dir", DIR);
    impl_fn_type!(is_regular, "regular", REG);
    impl_fn_type!(is_symlink, "symlink", LNK);
    impl_fn_type!(is_character, "character", CHR);
    impl_fn_type!(is_block, "block", BLK);
    impl_fn_type!(is_fifo, "fifo", FIFO);
    impl_fn_type!(is_socket, "socket", SOCK);

    /// Type bits of the mode, if the server sent permissions
    pub fn file_type(&self) -> Option<FileType> {
        self.permissions.and_then(FileType::from_mode)
    }

    /// Returns the size of the file
    pub fn len(&self) -> u64 {
        self.size.unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the last access time, epoch when absent
    pub fn accessed(&self) -> DateTime<Utc> {
        from_unix(self.atime)
    }

    /// Returns the last modification time, epoch when absent
    pub fn modified(&self) -> DateTime<Utc> {
        from_unix(self.mtime)
    }
}

fn from_unix(time: Option<u32>) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(i64::from(time.unwrap_or(0)), 0).unwrap_or_default()
}

impl From<&FileAttributes> for Bytes {
    fn from(attrs: &FileAttributes) -> Self {
        let mut flags = FileAttr::empty();

        if attrs.size.is_some() {
            flags |= FileAttr::SIZE;
        }

        if attrs.uid.is_some() || attrs.gid.is_some() {
            flags |= FileAttr::UIDGID;
        }

        if attrs.permissions.is_some() {
            flags |= FileAttr::PERMISSIONS;
        }

        if attrs.atime.is_some() || attrs.mtime.is_some() {
            flags |= FileAttr::ACMODTIME;
        }

        let mut bytes = BytesMut::new();
        bytes.put_u32(flags.bits());

        if let Some(size) = attrs.size {
            bytes.put_u64(size);
        }

        if flags.contains(FileAttr::UIDGID) {
            bytes.put_u32(attrs.uid.unwrap_or(0));
            bytes.put_u32(attrs.gid.unwrap_or(0));
        }

        if let Some(permissions) = attrs.permissions {
            bytes.put_u32(permissions);
        }

        if flags.contains(FileAttr::ACMODTIME) {
            bytes.put_u32(attrs.atime.unwrap_or(0));
            bytes.put_u32(attrs.mtime.unwrap_or(0));
        }

        bytes.freeze()
    }
}

impl TryFrom<&mut Bytes> for FileAttributes {
    type Error = error::Error;

    fn try_from(bytes: &mut Bytes) -> Result<Self, Self::Error> {
        let flags = FileAttr::from_bits_truncate(bytes.get_u32_checked()?);
        let mut attrs = Self::default();

        if flags.contains(FileAttr::SIZE) {
            attrs.size = Some(bytes.get_u64_checked()?);
        }

        if flags.contains(FileAttr::UIDGID) {
            attrs.uid = Some(bytes.get_u32_checked()?);
            attrs.gid = Some(bytes.get_u32_checked()?);
        }

        if flags.contains(FileAttr::PERMISSIONS) {
            attrs.permissions = Some(bytes.get_u32_checked()?);
        }

        if flags.contains(FileAttr::ACMODTIME) {
            attrs.atime = Some(bytes.get_u32_checked()?);
            attrs.mtime = Some(bytes.get_u32_checked()?);
        }

        // extended pairs carry nothing a listing needs
        if flags.contains(FileAttr::EXTENDED) {
            let count = bytes.get_u32_checked()?;
            for _ in 0..count {
                let name = bytes.try_get_string()?;
                let _ = bytes.try_get_bytes()?;
                trace!("skipping extended attribute {}", name);
            }
        }

        Ok(attrs)
    }
}
