use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::rc::Rc;

use globset::GlobBuilder;
use tracing::debug;

use crate::error::{XplatError, XplatResult};
use crate::path::{Comparison, FilePath, Processor};
use crate::platform::Platform;

use super::traits::{DirEntry, File, FileInfo, FileMode, FileSystem, OpenFlags};

/* 📖 # Why a flat map instead of a tree of directories?

Every operation starts from a name, so keying entries by their cleaned (and, on
case-insensitive platforms, lower-cased) path makes lookups a single map access.
Directory relations are recovered by comparing parsed paths segment by segment,
which keeps `/a/bc` from looking like a child of `/a/b`.

Entries are shared with open handles through `Rc<RefCell<..>>`: a handle keeps
seeing writes made through the filesystem and vice versa. That also makes
`MemoryFs` single-threaded; it is neither `Send` nor `Sync`.
*/

#[derive(Debug, Default)]
struct FileEntry {
    data: Vec<u8>,
    mode: FileMode,
}

#[derive(Debug, Clone)]
struct Node {
    /// Cleaned path in its original case
    path: FilePath,
    entry: Rc<RefCell<FileEntry>>,
}

/// Map-backed [`FileSystem`] for tests.
///
/// Clones share the same entries.
///
/// ```
/// use xplat_base::pal::{FileMode, FileSystem, MemoryFs};
/// use xplat_base::platform::Platform;
///
/// let fs = MemoryFs::for_platform(Platform::Windows);
/// fs.mkdir_all(r"c:\ProgramData\fake", FileMode::new(0o755)).unwrap();
/// fs.write_file(r"c:\ProgramData\fake\a.txt", b"hi", FileMode::new(0o644)).unwrap();
/// assert!(fs.exists("C:/programdata/FAKE/a.txt").unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct MemoryFs {
    nodes: Rc<RefCell<BTreeMap<String, Node>>>,
    processor: Processor,
}

impl MemoryFs {
    pub fn new(processor: Processor) -> Self {
        Self {
            nodes: Rc::new(RefCell::new(BTreeMap::new())),
            processor,
        }
    }

    pub fn for_platform(platform: Platform) -> Self {
        Self::new(Processor::new(platform))
    }

    /// Parses and cleans a name, returning the path and its map key.
    fn resolve(&self, name: &str) -> XplatResult<(FilePath, String)> {
        let mut path = self.processor.clean_path(&self.processor.parse(name)?);
        // `\\host\share\` and `\\host\share` are the same share root
        if path.is_abs() {
            path.segments.retain(|segment| !segment.is_empty());
        }
        let key = self.key_of(&path);
        Ok((path, key))
    }

    fn key_of(&self, path: &FilePath) -> String {
        let rendered = self.processor.render(path);
        match self.processor.comparison() {
            Comparison::IgnoreCase => rendered.to_lowercase(),
            Comparison::CaseSensitive => rendered,
        }
    }

    fn get(&self, key: &str) -> Option<Node> {
        self.nodes.borrow().get(key).cloned()
    }

    fn insert(&self, path: FilePath, entry: FileEntry) -> Rc<RefCell<FileEntry>> {
        let key = self.key_of(&path);
        let entry = Rc::new(RefCell::new(entry));
        self.nodes.borrow_mut().insert(
            key,
            Node {
                path,
                entry: Rc::clone(&entry),
            },
        );
        entry
    }

    /// Proper ancestors of `path`, outermost first. The root of an absolute path
    /// is included.
    fn ancestors(path: &FilePath) -> Vec<FilePath> {
        let segments = significant(path);
        let mut ancestors = Vec::with_capacity(segments.len());
        let mut accumulator = path.root();
        if path.is_abs() && !segments.is_empty() {
            ancestors.push(accumulator.clone());
        }
        for segment in segments.iter().take(segments.len().saturating_sub(1)) {
            accumulator.segments.push(segment.clone());
            ancestors.push(accumulator.clone());
        }
        ancestors
    }

    fn keys_below(&self, dir: &FilePath) -> Vec<String> {
        let cmp = self.processor.comparison();
        self.nodes
            .borrow()
            .iter()
            .filter(|(_, node)| is_below(&node.path, dir, cmp))
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn info(&self, path: &FilePath, entry: &FileEntry) -> FileInfo {
        FileInfo {
            name: self.processor.render(&path.base()),
            size: entry.data.len() as u64,
            mode: entry.mode,
        }
    }

    fn walk(
        &self,
        op: &'static str,
        name: &str,
        perm: FileMode,
        create: bool,
    ) -> XplatResult<()> {
        let (path, key) = self.resolve(name)?;
        for ancestor in Self::ancestors(&path) {
            let ancestor_key = self.key_of(&ancestor);
            match self.get(&ancestor_key) {
                Some(node) if node.entry.borrow().mode.is_dir() => {}
                Some(_) => {
                    return Err(Box::new(XplatError::invalid_operation(
                        op,
                        name,
                        format!("'{}' is not a directory", ancestor_key),
                    )));
                }
                None if create => {
                    debug!(path = %ancestor_key, "creating ancestor directory");
                    self.insert(
                        ancestor,
                        FileEntry {
                            data: Vec::new(),
                            mode: perm | FileMode::DIR,
                        },
                    );
                }
                None => return Err(Box::new(XplatError::not_exist(ancestor_key))),
            }
        }

        if let Some(node) = self.get(&key) {
            if create && node.entry.borrow().mode.is_dir() {
                return Ok(());
            }
            if create {
                return Err(Box::new(XplatError::invalid_operation(
                    op,
                    name,
                    "a file with that name exists",
                )));
            }
            return Err(Box::new(XplatError::already_exists(key)));
        }

        self.insert(
            path,
            FileEntry {
                data: Vec::new(),
                mode: perm | FileMode::DIR,
            },
        );
        Ok(())
    }

    fn open_handle(&self, name: &str, node: Node, offset: u64, writable: bool) -> Box<dyn File> {
        Box::new(MemoryFile {
            name: name.to_string(),
            info_name: self.processor.render(&node.path.base()),
            entry: node.entry,
            offset,
            writable,
        })
    }
}

/// Segments that name something: the `.` and `""` that survive cleaning
/// (`.` alone, `\\host\share\`) do not.
fn significant(path: &FilePath) -> Vec<String> {
    path.segments
        .iter()
        .filter(|segment| !segment.is_empty() && segment.as_str() != ".")
        .cloned()
        .collect()
}

fn is_below(path: &FilePath, dir: &FilePath, cmp: Comparison) -> bool {
    let dir_segments = significant(dir);
    let segments = significant(path);
    path.absolute == dir.absolute
        && path.volume.equal(&dir.volume, cmp)
        && segments.len() > dir_segments.len()
        && dir_segments
            .iter()
            .zip(&segments)
            .all(|(left, right)| cmp.equal(left, right))
}

impl FileSystem for MemoryFs {
    fn processor(&self) -> &Processor {
        &self.processor
    }

    fn open(&self, name: &str) -> XplatResult<Box<dyn File>> {
        self.open_file(name, OpenFlags::READ_ONLY, FileMode::default())
    }

    fn create(&self, name: &str) -> XplatResult<Box<dyn File>> {
        let (path, key) = self.resolve(name)?;
        let node = match self.get(&key) {
            Some(node) => {
                let mut entry = node.entry.borrow_mut();
                if entry.mode.is_dir() {
                    return Err(Box::new(XplatError::invalid_operation(
                        "create",
                        name,
                        "is a directory",
                    )));
                }
                entry.data.clear();
                entry.mode = FileMode::new(0o666);
                drop(entry);
                node
            }
            None => {
                let entry = self.insert(
                    path.clone(),
                    FileEntry {
                        data: Vec::new(),
                        mode: FileMode::new(0o666),
                    },
                );
                Node { path, entry }
            }
        };
        Ok(self.open_handle(name, node, 0, true))
    }

    fn open_file(
        &self,
        name: &str,
        flags: OpenFlags,
        perm: FileMode,
    ) -> XplatResult<Box<dyn File>> {
        let (path, key) = self.resolve(name)?;
        let node = match self.get(&key) {
            Some(node) => node,
            None if flags.is_read_only() => {
                return Err(Box::new(XplatError::not_exist(name)));
            }
            None => {
                let entry = self.insert(
                    path.clone(),
                    FileEntry {
                        data: Vec::new(),
                        mode: perm,
                    },
                );
                Node { path, entry }
            }
        };

        let offset = {
            let mut entry = node.entry.borrow_mut();
            if entry.mode.is_dir() && !flags.is_read_only() {
                return Err(Box::new(XplatError::invalid_operation(
                    "open",
                    name,
                    "is a directory",
                )));
            }
            if flags.truncate {
                entry.data.clear();
            }
            if flags.append { entry.data.len() as u64 } else { 0 }
        };

        Ok(self.open_handle(name, node, offset, flags.is_writable()))
    }

    fn read_file(&self, name: &str) -> XplatResult<Vec<u8>> {
        let (_, key) = self.resolve(name)?;
        let node = self
            .get(&key)
            .ok_or_else(|| Box::new(XplatError::not_exist(name)))?;
        let entry = node.entry.borrow();
        if entry.mode.is_dir() {
            return Err(Box::new(XplatError::invalid_operation(
                "read",
                name,
                "is a directory",
            )));
        }
        Ok(entry.data.clone())
    }

    fn write_file(&self, name: &str, data: &[u8], perm: FileMode) -> XplatResult<()> {
        let (path, key) = self.resolve(name)?;
        match self.get(&key) {
            Some(node) => {
                let mut entry = node.entry.borrow_mut();
                if entry.mode.is_dir() {
                    return Err(Box::new(XplatError::invalid_operation(
                        "write",
                        name,
                        "is a directory",
                    )));
                }
                entry.data = data.to_vec();
                entry.mode = perm;
            }
            None => {
                self.insert(
                    path,
                    FileEntry {
                        data: data.to_vec(),
                        mode: perm,
                    },
                );
            }
        }
        Ok(())
    }

    fn read_dir(&self, name: &str) -> XplatResult<Vec<DirEntry>> {
        let (dir, key) = self.resolve(name)?;
        let node = self
            .get(&key)
            .ok_or_else(|| Box::new(XplatError::not_exist(name)))?;
        if !node.entry.borrow().mode.is_dir() {
            return Err(Box::new(XplatError::invalid_operation(
                "read_dir",
                name,
                "not a directory",
            )));
        }

        let depth = significant(&dir).len() + 1;
        let cmp = self.processor.comparison();
        let mut entries: Vec<DirEntry> = self
            .nodes
            .borrow()
            .values()
            .filter(|child| {
                is_below(&child.path, &dir, cmp) && significant(&child.path).len() == depth
            })
            .map(|child| {
                let info = self.info(&child.path, &child.entry.borrow());
                DirEntry {
                    name: info.name.clone(),
                    info,
                }
            })
            .collect();
        entries.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(entries)
    }

    fn stat(&self, name: &str) -> XplatResult<FileInfo> {
        let (_, key) = self.resolve(name)?;
        let node = self
            .get(&key)
            .ok_or_else(|| Box::new(XplatError::not_exist(name)))?;
        let info = self.info(&node.path, &node.entry.borrow());
        Ok(info)
    }

    fn exists(&self, name: &str) -> XplatResult<bool> {
        let (_, key) = self.resolve(name)?;
        Ok(self.nodes.borrow().contains_key(&key))
    }

    fn mkdir(&self, name: &str, perm: FileMode) -> XplatResult<()> {
        self.walk("mkdir", name, perm, false)
    }

    fn mkdir_all(&self, name: &str, perm: FileMode) -> XplatResult<()> {
        self.walk("mkdir_all", name, perm, true)
    }

    fn remove(&self, name: &str) -> XplatResult<()> {
        let (path, key) = self.resolve(name)?;
        if !self.nodes.borrow().contains_key(&key) {
            return Err(Box::new(XplatError::not_exist(name)));
        }
        if !self.keys_below(&path).is_empty() {
            return Err(Box::new(XplatError::invalid_operation(
                "remove",
                name,
                "directory is not empty",
            )));
        }
        self.nodes.borrow_mut().remove(&key);
        Ok(())
    }

    fn remove_all(&self, name: &str) -> XplatResult<()> {
        let (path, key) = self.resolve(name)?;
        let below = self.keys_below(&path);
        let mut nodes = self.nodes.borrow_mut();
        nodes.remove(&key);
        for child in below {
            nodes.remove(&child);
        }
        Ok(())
    }

    fn rename(&self, old_name: &str, new_name: &str) -> XplatResult<()> {
        let (old_path, old_key) = self.resolve(old_name)?;
        let (new_path, _) = self.resolve(new_name)?;
        let node = self
            .get(&old_key)
            .ok_or_else(|| Box::new(XplatError::not_exist(old_name)))?;

        let old_depth = significant(&old_path).len();
        let moved: Vec<(String, Node)> = self
            .keys_below(&old_path)
            .into_iter()
            .filter_map(|key| self.get(&key).map(|child| (key, child)))
            .collect();

        let mut nodes = self.nodes.borrow_mut();
        nodes.remove(&old_key);
        for (key, _) in &moved {
            nodes.remove(key);
        }
        drop(nodes);

        self.nodes.borrow_mut().insert(
            self.key_of(&new_path),
            Node {
                path: new_path.clone(),
                entry: node.entry,
            },
        );
        for (_, child) in moved {
            let tail = FilePath::relative(significant(&child.path).split_off(old_depth));
            let path = new_path.join(&tail);
            let key = self.key_of(&path);
            self.nodes.borrow_mut().insert(
                key,
                Node {
                    path,
                    entry: child.entry,
                },
            );
        }
        Ok(())
    }

    fn glob(&self, pattern: &str) -> XplatResult<Vec<String>> {
        let windows_style = self.processor.parser().is_separator('\\');
        let pattern = if windows_style {
            pattern.replace('\\', "/")
        } else {
            pattern.to_string()
        };
        let matcher = GlobBuilder::new(&pattern)
            .case_insensitive(self.processor.comparison() == Comparison::IgnoreCase)
            .literal_separator(true)
            .build()
            .map_err(|e| crate::err!("Invalid glob pattern '{}': {}", pattern, e))?
            .compile_matcher();

        // BTreeMap keys iterate sorted
        Ok(self
            .nodes
            .borrow()
            .keys()
            .filter(|key| {
                if windows_style {
                    matcher.is_match(key.replace('\\', "/"))
                } else {
                    matcher.is_match(key.as_str())
                }
            })
            .cloned()
            .collect())
    }
}

/// Handle onto a [`MemoryFs`] entry.
#[derive(Debug)]
pub struct MemoryFile {
    name: String,
    info_name: String,
    entry: Rc<RefCell<FileEntry>>,
    offset: u64,
    writable: bool,
}

fn invalid_input(op: &str, name: &str, reason: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{} {}: {}", op, name, reason),
    )
}

impl Read for MemoryFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let entry = self.entry.borrow();
        if entry.mode.is_dir() {
            return Err(invalid_input("read", &self.name, "is a directory"));
        }
        let len = entry.data.len() as u64;
        if self.offset >= len {
            return Ok(0);
        }
        let start = self.offset as usize;
        let n = buf.len().min(entry.data.len() - start);
        buf[..n].copy_from_slice(&entry.data[start..start + n]);
        self.offset += n as u64;
        Ok(n)
    }
}

impl Write for MemoryFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writable {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("write {}: handle is read-only", self.name),
            ));
        }
        let mut entry = self.entry.borrow_mut();
        if entry.mode.is_dir() {
            return Err(invalid_input("write", &self.name, "is a directory"));
        }
        let start = (self.offset as usize).min(entry.data.len());
        let end = start + buf.len();
        if end > entry.data.len() {
            entry.data.resize(end, 0);
        }
        entry.data[start..end].copy_from_slice(buf);
        self.offset = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let len = self.entry.borrow().data.len() as i128;
        let target = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::Current(delta) => self.offset as i128 + delta as i128,
            SeekFrom::End(delta) => len + delta as i128,
        };
        if target < 0 || target > len {
            return Err(invalid_input(
                "seek",
                &self.name,
                &format!("offset {} outside 0..={}", target, len),
            ));
        }
        self.offset = target as u64;
        Ok(self.offset)
    }
}

impl File for MemoryFile {
    fn stat(&self) -> XplatResult<FileInfo> {
        let entry = self.entry.borrow();
        Ok(FileInfo {
            name: self.info_name.clone(),
            size: entry.data.len() as u64,
            mode: entry.mode,
        })
    }

    fn close(self: Box<Self>) -> XplatResult<()> {
        Ok(())
    }
}
