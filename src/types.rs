//! Core value types exchanged between bound paths and accessors.

use std::time::SystemTime;

use crate::{PathError, PurePath};

/// Type of an entry in a resource space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
    /// Character device.
    CharDevice,
    /// Block device.
    BlockDevice,
    /// Named pipe.
    Fifo,
    /// Unix domain socket.
    Socket,
}

impl FileType {
    /// The `S_IFMT` bits for this type.
    pub const fn mode_bits(self) -> u32 {
        match self {
            FileType::File => 0o100000,
            FileType::Directory => 0o040000,
            FileType::Symlink => 0o120000,
            FileType::CharDevice => 0o020000,
            FileType::BlockDevice => 0o060000,
            FileType::Fifo => 0o010000,
            FileType::Socket => 0o140000,
        }
    }

    /// Decode the `S_IFMT` bits of a full mode, if they name a known type.
    pub const fn from_mode(mode: u32) -> Option<Self> {
        Some(match mode & 0o170000 {
            0o100000 => FileType::File,
            0o040000 => FileType::Directory,
            0o120000 => FileType::Symlink,
            0o020000 => FileType::CharDevice,
            0o060000 => FileType::BlockDevice,
            0o010000 => FileType::Fifo,
            0o140000 => FileType::Socket,
            _ => return None,
        })
    }
}

/// Unix-style permissions stored as a mode bitmask.
///
/// Uses the standard Unix permission bits (rwxrwxrwx plus setuid, setgid
/// and sticky).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Permissions(u32);

impl Permissions {
    /// Create permissions from a Unix mode (e.g., 0o755).
    #[inline]
    pub const fn from_mode(mode: u32) -> Self {
        Self(mode & 0o7777)
    }

    /// Get the raw mode value.
    #[inline]
    pub const fn mode(&self) -> u32 {
        self.0
    }

    /// Returns `true` if these permissions deny writing.
    #[inline]
    pub const fn readonly(&self) -> bool {
        (self.0 & 0o222) == 0
    }

    /// Default permissions for a new file (0o644 = rw-r--r--).
    #[inline]
    pub const fn default_file() -> Self {
        Self(0o644)
    }

    /// Default permissions for a new directory (0o755 = rwxr-xr-x).
    #[inline]
    pub const fn default_dir() -> Self {
        Self(0o755)
    }

    /// Default permissions for a new symlink (0o777).
    #[inline]
    pub const fn default_symlink() -> Self {
        Self(0o777)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::default_file()
    }
}

/// Result of `stat`/`lstat`.
///
/// Backends fill what they know. Absent fields keep their defaults: zero
/// size, epoch timestamps, [`Permissions::default_file`], no owner, no ids.
///
/// A `Stat` is also the description handed to
/// [`AccessorWrite::create`](crate::AccessorWrite::create) for new entries.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stat {
    /// Kind of entry.
    pub file_type: FileType,
    /// Size in bytes.
    pub size: u64,
    /// Permission bits.
    pub permissions: Permissions,
    /// Owner name.
    pub user: Option<String>,
    /// Group name.
    pub group: Option<String>,
    /// Numeric owner id.
    pub user_id: Option<u32>,
    /// Numeric group id.
    pub group_id: Option<u32>,
    /// Device (or resource space) id.
    pub device_id: Option<u64>,
    /// Entry id, unique within the device.
    pub file_id: Option<u64>,
    /// Number of hard links.
    pub nlink: u64,
    /// Last access time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub accessed: SystemTime,
    /// Last modification time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub modified: SystemTime,
    /// Creation time.
    #[cfg_attr(feature = "serde", serde(with = "system_time_serde"))]
    pub created: SystemTime,
    /// Link target, for symlinks.
    pub target: Option<PurePath>,
}

impl Stat {
    /// A regular file of `size` bytes with default permissions.
    pub fn file(size: u64) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// A directory with default permissions.
    pub fn directory() -> Self {
        Self {
            file_type: FileType::Directory,
            permissions: Permissions::default_dir(),
            ..Self::default()
        }
    }

    /// A symlink pointing at `target`.
    pub fn symlink(target: impl Into<PurePath>) -> Self {
        Self {
            file_type: FileType::Symlink,
            permissions: Permissions::default_symlink(),
            target: Some(target.into()),
            ..Self::default()
        }
    }

    /// Replace the permission bits.
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.permissions = Permissions::from_mode(mode);
        self
    }

    /// Type bits combined with permission bits, like `st_mode`.
    pub fn mode(&self) -> u32 {
        self.file_type.mode_bits() | self.permissions.mode()
    }

    /// Returns `true` if this is a regular file.
    #[inline]
    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    /// Returns `true` if this is a directory.
    #[inline]
    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    /// Returns `true` if this is a symbolic link.
    #[inline]
    pub fn is_symlink(&self) -> bool {
        self.file_type == FileType::Symlink
    }
}

impl Default for Stat {
    fn default() -> Self {
        Self {
            file_type: FileType::File,
            size: 0,
            permissions: Permissions::default_file(),
            user: None,
            group: None,
            user_id: None,
            group_id: None,
            device_id: None,
            file_id: None,
            nlink: 1,
            accessed: SystemTime::UNIX_EPOCH,
            modified: SystemTime::UNIX_EPOCH,
            created: SystemTime::UNIX_EPOCH,
            target: None,
        }
    }
}

/// A directory entry returned from `scandir`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirEntry {
    /// Name of the entry (final segment only).
    pub name: String,
    /// Full path to the entry.
    pub path: PurePath,
    /// Result of `lstat` on the entry.
    pub stat: Stat,
}

/// How to open a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OpenMode {
    /// Open for reading.
    pub read: bool,
    /// Open for writing.
    pub write: bool,
    /// Create the file if it doesn't exist.
    pub create: bool,
    /// Fail if the file already exists.
    pub exclusive: bool,
    /// Truncate the file to zero length.
    pub truncate: bool,
    /// Append to the end of the file.
    pub append: bool,
}

impl OpenMode {
    /// Read-only access (`"r"`).
    pub const READ: Self = Self {
        read: true,
        write: false,
        create: false,
        exclusive: false,
        truncate: false,
        append: false,
    };

    /// Write access with create and truncate (`"w"`).
    pub const WRITE: Self = Self {
        read: false,
        write: true,
        create: true,
        exclusive: false,
        truncate: true,
        append: false,
    };

    /// Append mode (`"a"`).
    pub const APPEND: Self = Self {
        read: false,
        write: true,
        create: true,
        exclusive: false,
        truncate: false,
        append: true,
    };

    /// Exclusive creation (`"x"`).
    pub const CREATE_NEW: Self = Self {
        read: false,
        write: true,
        create: true,
        exclusive: true,
        truncate: false,
        append: false,
    };

    /// Read and write an existing file (`"r+"`).
    pub const READ_WRITE: Self = Self {
        read: true,
        write: true,
        create: false,
        exclusive: false,
        truncate: false,
        append: false,
    };

    /// Parse a conventional mode string such as `"rb"`, `"w"` or `"a+"`.
    ///
    /// Exactly one of `r`, `w`, `a`, `x` is required; `+` adds the other
    /// direction; `b` and `t` are accepted and ignored.
    ///
    /// # Errors
    ///
    /// - [`PathError::InvalidMode`] for anything else
    pub fn parse(mode: &str) -> Result<Self, PathError> {
        let invalid = || PathError::InvalidMode {
            mode: mode.to_owned(),
        };
        let mut base: Option<Self> = None;
        let mut plus = false;
        let mut text = None;
        for c in mode.chars() {
            let next = match c {
                'r' => Self::READ,
                'w' => Self::WRITE,
                'a' => Self::APPEND,
                'x' => Self::CREATE_NEW,
                '+' if !plus => {
                    plus = true;
                    continue;
                }
                'b' | 't' if text.is_none() => {
                    text = Some(c);
                    continue;
                }
                _ => return Err(invalid()),
            };
            if base.replace(next).is_some() {
                return Err(invalid());
            }
        }
        let mut parsed = base.ok_or_else(invalid)?;
        if plus {
            parsed.read = true;
            parsed.write = true;
        }
        Ok(parsed)
    }

    /// Returns `true` if the mode never writes.
    pub fn is_read_only(&self) -> bool {
        !self.write
    }
}

/// Serde support for SystemTime (when serde feature is enabled).
#[cfg(feature = "serde")]
mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        (duration.as_secs(), duration.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos): (u64, u32) = Deserialize::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::new(secs, nanos))
    }
}
