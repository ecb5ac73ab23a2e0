use std::fs;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::error::{XplatError, XplatResult};
use crate::path::Processor;
use crate::platform::Platform;

use super::traits::{DirEntry, File, FileInfo, FileMode, FileSystem, OpenFlags};

/* 📖 # Why std::fs and no async?

Every operation here is a single synchronous syscall (or a walk for `glob`).
Callers are CLIs and tests, so blocking I/O keeps the backend a thin, readable
mapping from the `FileSystem` contract to `std::fs`.
*/

/// [`FileSystem`] backed by the machine's filesystem.
#[derive(Debug, Clone)]
pub struct RealFs {
    processor: Processor,
}

impl RealFs {
    /// Uses the path rules of the platform this binary was built for.
    pub fn new() -> Self {
        Self::with_processor(Processor::new(Platform::current()))
    }

    pub fn with_processor(processor: Processor) -> Self {
        Self { processor }
    }

    fn info(&self, name: &str, metadata: &fs::Metadata) -> XplatResult<FileInfo> {
        Ok(FileInfo {
            name: self.processor.base(name)?,
            size: metadata.len(),
            mode: file_mode(metadata),
        })
    }
}

impl Default for RealFs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
fn file_mode(metadata: &fs::Metadata) -> FileMode {
    use std::os::unix::fs::PermissionsExt;
    let perm = FileMode::new(metadata.permissions().mode() & FileMode::PERM_MASK);
    if metadata.is_dir() {
        perm | FileMode::DIR
    } else {
        perm
    }
}

#[cfg(not(unix))]
fn file_mode(metadata: &fs::Metadata) -> FileMode {
    let bits = match (metadata.is_dir(), metadata.permissions().readonly()) {
        (true, _) => 0o777,
        (false, true) => 0o444,
        (false, false) => 0o666,
    };
    let perm = FileMode::new(bits);
    if metadata.is_dir() {
        perm | FileMode::DIR
    } else {
        perm
    }
}

/// Maps missing and duplicate entries onto the portable kinds, keeping the
/// native error as the cause.
fn io_error(name: &str, error: io::Error) -> Box<XplatError> {
    debug!(error = %error, "filesystem operation failed");
    match error.kind() {
        io::ErrorKind::NotFound => Box::new(
            XplatError::not_exist(name).caused_by(XplatError::file_error(name, error)),
        ),
        io::ErrorKind::AlreadyExists => Box::new(
            XplatError::already_exists(name).caused_by(XplatError::file_error(name, error)),
        ),
        _ => Box::new(XplatError::file_error(name, error)),
    }
}

#[cfg(unix)]
fn apply_mode(options: &mut fs::OpenOptions, perm: FileMode) {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(perm.perm());
}

#[cfg(not(unix))]
fn apply_mode(_options: &mut fs::OpenOptions, _perm: FileMode) {}

#[cfg(unix)]
fn dir_builder(perm: FileMode) -> fs::DirBuilder {
    use std::os::unix::fs::DirBuilderExt;
    let mut builder = fs::DirBuilder::new();
    builder.mode(perm.perm());
    builder
}

#[cfg(not(unix))]
fn dir_builder(_perm: FileMode) -> fs::DirBuilder {
    fs::DirBuilder::new()
}

/// Longest leading part of a glob pattern without wildcards, cut back to a
/// directory boundary.
fn literal_prefix<'a>(pattern: &'a str, processor: &Processor) -> &'a str {
    let wildcard = pattern
        .find(['*', '?', '[', '{'])
        .unwrap_or(pattern.len());
    match pattern[..wildcard].rfind(|c| processor.parser().is_separator(c)) {
        Some(0) => &pattern[..1],
        Some(index) => &pattern[..index],
        None => "",
    }
}

impl FileSystem for RealFs {
    fn processor(&self) -> &Processor {
        &self.processor
    }

    #[instrument(skip(self))]
    fn open(&self, name: &str) -> XplatResult<Box<dyn File>> {
        self.open_file(name, OpenFlags::READ_ONLY, FileMode::default())
    }

    #[instrument(skip(self))]
    fn create(&self, name: &str) -> XplatResult<Box<dyn File>> {
        self.open_file(
            name,
            OpenFlags::READ_WRITE.create().truncate(),
            FileMode::new(0o666),
        )
    }

    #[instrument(skip(self))]
    fn open_file(
        &self,
        name: &str,
        flags: OpenFlags,
        perm: FileMode,
    ) -> XplatResult<Box<dyn File>> {
        let mut options = fs::OpenOptions::new();
        options
            .read(flags.read)
            .write(flags.write)
            .append(flags.append)
            .truncate(flags.truncate)
            .create(flags.create);
        apply_mode(&mut options, perm);
        let file = options.open(name).map_err(|e| io_error(name, e))?;
        debug!("file opened successfully");
        Ok(Box::new(RealFile {
            file,
            path: PathBuf::from(name),
            name: self.processor.base(name)?,
        }))
    }

    #[instrument(skip(self))]
    fn read_file(&self, name: &str) -> XplatResult<Vec<u8>> {
        let data = fs::read(name).map_err(|e| io_error(name, e))?;
        debug!(bytes = data.len(), "file read");
        Ok(data)
    }

    #[instrument(skip(self, data), fields(bytes = data.len()))]
    fn write_file(&self, name: &str, data: &[u8], perm: FileMode) -> XplatResult<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        apply_mode(&mut options, perm);
        let mut file = options.open(name).map_err(|e| io_error(name, e))?;
        file.write_all(data).map_err(|e| io_error(name, e))?;
        debug!("file written");
        Ok(())
    }

    #[instrument(skip(self))]
    fn read_dir(&self, name: &str) -> XplatResult<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(name).map_err(|e| io_error(name, e))? {
            let entry = entry.map_err(|e| io_error(name, e))?;
            let metadata = entry.metadata().map_err(|e| io_error(name, e))?;
            let child_name = entry.file_name().to_string_lossy().into_owned();
            entries.push(DirEntry {
                info: FileInfo {
                    name: child_name.clone(),
                    size: metadata.len(),
                    mode: file_mode(&metadata),
                },
                name: child_name,
            });
        }
        entries.sort_by(|left, right| left.name.cmp(&right.name));
        debug!(count = entries.len(), "directory listed");
        Ok(entries)
    }

    #[instrument(skip(self))]
    fn stat(&self, name: &str) -> XplatResult<FileInfo> {
        let metadata = fs::metadata(name).map_err(|e| io_error(name, e))?;
        self.info(name, &metadata)
    }

    #[instrument(skip(self))]
    fn exists(&self, name: &str) -> XplatResult<bool> {
        let exists = Path::new(name)
            .try_exists()
            .map_err(|e| io_error(name, e))?;
        debug!(exists, "checked existence");
        Ok(exists)
    }

    #[instrument(skip(self))]
    fn mkdir(&self, name: &str, perm: FileMode) -> XplatResult<()> {
        dir_builder(perm)
            .create(name)
            .map_err(|e| io_error(name, e))?;
        debug!("directory created");
        Ok(())
    }

    #[instrument(skip(self))]
    fn mkdir_all(&self, name: &str, perm: FileMode) -> XplatResult<()> {
        dir_builder(perm)
            .recursive(true)
            .create(name)
            .map_err(|e| io_error(name, e))?;
        debug!("directory and parents created");
        Ok(())
    }

    #[instrument(skip(self))]
    fn remove(&self, name: &str) -> XplatResult<()> {
        let metadata = fs::symlink_metadata(name).map_err(|e| io_error(name, e))?;
        let result = if metadata.is_dir() {
            fs::remove_dir(name)
        } else {
            fs::remove_file(name)
        };
        result.map_err(|e| match e.kind() {
            io::ErrorKind::DirectoryNotEmpty => Box::new(XplatError::invalid_operation(
                "remove",
                name,
                "directory is not empty",
            )),
            _ => io_error(name, e),
        })?;
        debug!("entry removed");
        Ok(())
    }

    #[instrument(skip(self))]
    fn remove_all(&self, name: &str) -> XplatResult<()> {
        let metadata = match fs::symlink_metadata(name) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("nothing to remove");
                return Ok(());
            }
            Err(e) => return Err(io_error(name, e)),
        };
        let result = if metadata.is_dir() {
            fs::remove_dir_all(name)
        } else {
            fs::remove_file(name)
        };
        result.map_err(|e| io_error(name, e))?;
        debug!("entry and contents removed");
        Ok(())
    }

    #[instrument(skip(self))]
    fn rename(&self, old_name: &str, new_name: &str) -> XplatResult<()> {
        fs::rename(old_name, new_name).map_err(|e| io_error(old_name, e))?;
        debug!("entry renamed");
        Ok(())
    }

    #[instrument(skip(self))]
    fn glob(&self, pattern: &str) -> XplatResult<Vec<String>> {
        let windows_style = self.processor.parser().is_separator('\\');
        let portable = |s: &str| {
            if windows_style {
                s.replace('\\', "/")
            } else {
                s.to_string()
            }
        };
        let matcher = GlobBuilder::new(&portable(pattern))
            .case_insensitive(windows_style)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                debug!(pattern = %pattern, error = %e, "failed to compile glob pattern");
                crate::err!("Invalid glob pattern '{}': {}", pattern, e)
            })?
            .compile_matcher();

        let prefix = literal_prefix(pattern, &self.processor);
        let root = if prefix.is_empty() { "." } else { prefix };
        if !Path::new(root).exists() {
            debug!(root, "glob root does not exist");
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for entry in WalkDir::new(root).min_depth(1) {
            let entry = entry.map_err(|e| {
                debug!(error = %e, "error walking directory");
                let path = e
                    .path()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_else(|| root.to_string());
                Box::new(XplatError::file_error(path, io::Error::other(e.to_string())))
            })?;
            let path = if prefix.is_empty() {
                entry.path().strip_prefix(".").unwrap_or(entry.path())
            } else {
                entry.path()
            };
            let candidate = path.to_string_lossy();
            if matcher.is_match(portable(&candidate)) {
                matches.push(candidate.into_owned());
            }
        }
        matches.sort();
        debug!(count = matches.len(), "glob matched");
        Ok(matches)
    }
}

/// Handle onto an OS file.
#[derive(Debug)]
pub struct RealFile {
    file: fs::File,
    path: PathBuf,
    name: String,
}

impl Read for RealFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for RealFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for RealFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl File for RealFile {
    fn stat(&self) -> XplatResult<FileInfo> {
        let metadata = self
            .file
            .metadata()
            .map_err(|e| Box::new(XplatError::file_error(&self.path, e)))?;
        Ok(FileInfo {
            name: self.name.clone(),
            size: metadata.len(),
            mode: file_mode(&metadata),
        })
    }

    fn close(self: Box<Self>) -> XplatResult<()> {
        self.file
            .sync_all()
            .map_err(|e| Box::new(XplatError::file_error(&self.path, e)))
    }
}
