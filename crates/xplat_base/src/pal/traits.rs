use std::fmt;
use std::io::{Read, Seek, Write};
use std::ops::BitOr;

use crate::XplatResult;
use crate::path::Processor;

use super::sub::SubFs;

/* 📖 # Why is FileSystem a trait instead of a struct?

Tools built on xplat create directories, write config files and glob for inputs.
Against `RealFs` that touches the disk; against `MemoryFs` the same code runs in
a unit test with Windows or Unix path rules, whatever the machine running the
test. Code depends on the trait, the host decides which implementation it gets.
*/

/// Permission bits plus the directory flag.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileMode(u32);

impl FileMode {
    pub const DIR: FileMode = FileMode(1 << 31);
    pub const PERM_MASK: u32 = 0o777;

    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn is_dir(&self) -> bool {
        self.0 & Self::DIR.0 != 0
    }

    /// The Unix permission bits.
    pub const fn perm(&self) -> u32 {
        self.0 & Self::PERM_MASK
    }
}

impl BitOr for FileMode {
    type Output = FileMode;

    fn bitor(self, rhs: FileMode) -> FileMode {
        FileMode(self.0 | rhs.0)
    }
}

impl From<u32> for FileMode {
    fn from(bits: u32) -> Self {
        FileMode(bits)
    }
}

impl fmt::Debug for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_dir() { 'd' } else { '-' };
        write!(f, "FileMode({}{:03o})", kind, self.perm())
    }
}

/// How [`FileSystem::open_file`] opens an entry.
///
/// ```
/// use xplat_base::pal::OpenFlags;
///
/// let flags = OpenFlags::WRITE_ONLY.create().append();
/// assert!(flags.is_writable());
/// assert!(OpenFlags::READ_ONLY.is_read_only());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub truncate: bool,
    pub create: bool,
}

impl OpenFlags {
    pub const READ_ONLY: OpenFlags = OpenFlags {
        read: true,
        write: false,
        append: false,
        truncate: false,
        create: false,
    };
    pub const WRITE_ONLY: OpenFlags = OpenFlags {
        read: false,
        write: true,
        append: false,
        truncate: false,
        create: false,
    };
    pub const READ_WRITE: OpenFlags = OpenFlags {
        read: true,
        write: true,
        append: false,
        truncate: false,
        create: false,
    };

    pub fn append(mut self) -> Self {
        self.append = true;
        self
    }

    pub fn truncate(mut self) -> Self {
        self.truncate = true;
        self
    }

    pub fn create(mut self) -> Self {
        self.create = true;
        self
    }

    pub fn is_writable(&self) -> bool {
        self.write || self.append
    }

    /// No flag asks to modify or create the entry.
    pub fn is_read_only(&self) -> bool {
        !(self.write || self.append || self.truncate || self.create)
    }
}

/// Metadata of a file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Base name of the entry
    pub name: String,
    pub size: u64,
    pub mode: FileMode,
}

impl FileInfo {
    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }
}

/// One child returned by [`FileSystem::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub info: FileInfo,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.info.is_dir()
    }
}

/// An open file handle.
///
/// `Read`, `Write` and `Seek` report failures as `std::io::Error`, as the std
/// traits require.
pub trait File: Read + Write + Seek + fmt::Debug {
    fn stat(&self) -> XplatResult<FileInfo>;

    /// Releases the handle.
    fn close(self: Box<Self>) -> XplatResult<()>;
}

/// Filesystem operations shared by the in-memory and OS-backed implementations.
///
/// Names are strings in the grammar of the filesystem's [`Processor`].
pub trait FileSystem: fmt::Debug {
    /// The processor used to interpret names.
    fn processor(&self) -> &Processor;

    /// Opens an existing entry read-only.
    fn open(&self, name: &str) -> XplatResult<Box<dyn File>>;

    /// Creates or truncates a file and opens it read/write.
    fn create(&self, name: &str) -> XplatResult<Box<dyn File>>;

    fn open_file(&self, name: &str, flags: OpenFlags, perm: FileMode)
    -> XplatResult<Box<dyn File>>;

    fn read_file(&self, name: &str) -> XplatResult<Vec<u8>>;

    /// Reads a whole file as UTF-8.
    fn read_to_string(&self, name: &str) -> XplatResult<String> {
        let data = self.read_file(name)?;
        String::from_utf8(data).map_err(|_e| crate::err!("File is not valid UTF-8: {}", name))
    }

    /// Replaces the contents of a file, creating it when missing.
    fn write_file(&self, name: &str, data: &[u8], perm: FileMode) -> XplatResult<()>;

    /// Immediate children of a directory, sorted by name.
    fn read_dir(&self, name: &str) -> XplatResult<Vec<DirEntry>>;

    fn stat(&self, name: &str) -> XplatResult<FileInfo>;

    fn exists(&self, name: &str) -> XplatResult<bool>;

    /// Creates one directory. Every ancestor must already exist.
    fn mkdir(&self, name: &str, perm: FileMode) -> XplatResult<()>;

    /// Creates a directory and any missing ancestors.
    fn mkdir_all(&self, name: &str, perm: FileMode) -> XplatResult<()>;

    /// Removes a file or an empty directory.
    fn remove(&self, name: &str) -> XplatResult<()>;

    /// Removes an entry and everything below it. A missing entry is not an error.
    fn remove_all(&self, name: &str) -> XplatResult<()>;

    fn rename(&self, old_name: &str, new_name: &str) -> XplatResult<()>;

    /// Names matching a glob pattern, sorted.
    fn glob(&self, pattern: &str) -> XplatResult<Vec<String>>;

    /// A view of this filesystem rooted at `dir`.
    fn sub(&self, dir: &str) -> XplatResult<SubFs<Self>>
    where
        Self: Sized + Clone,
    {
        SubFs::new(self.clone(), dir)
    }
}
