use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::protocol::{File, FileType};

/// Kind of a directory entry, shown with the `ls -l` type letters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryType {
    Regular,
    Directory,
    Symlink,
    /// Block `b`, character `c`, fifo `p` or socket `s`
    Special(char),
    Unknown,
}

impl EntryType {
    pub fn tag(self) -> char {
        match self {
            Self::Regular => '-',
            Self::Directory => 'd',
            Self::Symlink => 'l',
            Self::Special(c) => c,
            Self::Unknown => '?',
        }
    }

    fn from_mode(mode: Option<u32>) -> Self {
        match mode.and_then(FileType::from_mode) {
            Some(FileType::REG) => Self::Regular,
            Some(FileType::DIR) => Self::Directory,
            Some(FileType::LNK) => Self::Symlink,
            Some(FileType::BLK) => Self::Special('b'),
            Some(FileType::CHR) => Self::Special('c'),
            Some(FileType::FIFO) => Self::Special('p'),
            Some(FileType::SOCK) => Self::Special('s'),
            _ => Self::Unknown,
        }
    }
}

/// Permission letters per class, absent bits left out (`0o640` gives
/// `rw`, `r` and an empty string)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Rights {
    pub user: String,
    pub group: String,
    pub other: String,
}

impl Rights {
    fn from_mode(mode: u32) -> Self {
        Self {
            user: letters(mode >> 6),
            group: letters(mode >> 3),
            other: letters(mode),
        }
    }
}

fn letters(bits: u32) -> String {
    [(0o4, 'r'), (0o2, 'w'), (0o1, 'x')]
        .into_iter()
        .filter(|(bit, _)| bits & bit != 0)
        .map(|(_, letter)| letter)
        .collect()
}

/// One child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub size: u64,
    pub modify_time: DateTime<Utc>,
    pub access_time: DateTime<Utc>,
    pub rights: Rights,
    pub owner: u32,
    pub group: u32,
    pub long_name: String,
}

impl From<File> for Entry {
    fn from(file: File) -> Self {
        let attrs = &file.attrs;

        Self {
            entry_type: EntryType::from_mode(attrs.permissions),
            size: attrs.len(),
            modify_time: attrs.modified(),
            access_time: attrs.accessed(),
            rights: Rights::from_mode(attrs.permissions.unwrap_or(0)),
            owner: attrs.uid.unwrap_or(0),
            group: attrs.gid.unwrap_or(0),
            name: file.filename,
            long_name: file.longname,
        }
    }
}
