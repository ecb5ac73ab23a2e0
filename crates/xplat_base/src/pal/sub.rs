use relative_path::{Component, RelativePath};

use crate::error::{ResultExt, XplatError, XplatResult};
use crate::path::Processor;

use super::traits::{DirEntry, File, FileInfo, FileMode, FileSystem, OpenFlags};

/// A [`FileSystem`] view of one directory of another filesystem.
///
/// Names given to the view must be relative and may not climb out of the
/// directory. Glob matches are returned relative to the directory.
///
/// ```
/// use xplat_base::pal::{FileMode, FileSystem, MemoryFs};
/// use xplat_base::platform::Platform;
///
/// let fs = MemoryFs::for_platform(Platform::Linux);
/// fs.mkdir_all("/project/src", FileMode::new(0o755)).unwrap();
/// let project = fs.sub("/project").unwrap();
/// project.write_file("src/main.rs", b"fn main() {}", FileMode::new(0o644)).unwrap();
/// assert!(fs.exists("/project/src/main.rs").unwrap());
/// assert!(project.read_file("../etc/passwd").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SubFs<F> {
    inner: F,
    dir: String,
}

impl<F: FileSystem> SubFs<F> {
    /// Fails unless `dir` is an existing directory of `inner`.
    pub fn new(inner: F, dir: &str) -> XplatResult<Self> {
        let info = inner
            .stat(dir)
            .with_context(|| format!("opening sub filesystem at '{}'", dir))?;
        if !info.is_dir() {
            return Err(Box::new(XplatError::invalid_operation(
                "sub",
                dir,
                "not a directory",
            )));
        }
        let dir = inner.processor().clean(dir)?;
        Ok(Self { inner, dir })
    }

    /// The directory this view is rooted at, as named in the inner filesystem.
    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Maps a name of this view to the name in the inner filesystem.
    fn full_name(&self, op: &'static str, name: &str) -> XplatResult<String> {
        let processor = self.inner.processor();
        let path = processor.parse(name)?;
        if path.is_abs() || !path.volume.is_empty() {
            return Err(Box::new(XplatError::invalid_operation(
                op,
                name,
                "name must be relative to the sub filesystem",
            )));
        }

        let portable = if processor.parser().is_separator('\\') {
            name.replace('\\', "/")
        } else {
            name.to_string()
        };
        let normalized = RelativePath::new(&portable).normalize();
        if normalized.components().next() == Some(Component::ParentDir) {
            return Err(Box::new(XplatError::invalid_operation(
                op,
                name,
                "name escapes the sub filesystem",
            )));
        }

        processor.join(&[&self.dir, name])
    }
}

impl<F: FileSystem> FileSystem for SubFs<F> {
    fn processor(&self) -> &Processor {
        self.inner.processor()
    }

    fn open(&self, name: &str) -> XplatResult<Box<dyn File>> {
        self.inner.open(&self.full_name("open", name)?)
    }

    fn create(&self, name: &str) -> XplatResult<Box<dyn File>> {
        self.inner.create(&self.full_name("create", name)?)
    }

    fn open_file(
        &self,
        name: &str,
        flags: OpenFlags,
        perm: FileMode,
    ) -> XplatResult<Box<dyn File>> {
        self.inner
            .open_file(&self.full_name("open", name)?, flags, perm)
    }

    fn read_file(&self, name: &str) -> XplatResult<Vec<u8>> {
        self.inner.read_file(&self.full_name("read", name)?)
    }

    fn write_file(&self, name: &str, data: &[u8], perm: FileMode) -> XplatResult<()> {
        self.inner
            .write_file(&self.full_name("write", name)?, data, perm)
    }

    fn read_dir(&self, name: &str) -> XplatResult<Vec<DirEntry>> {
        self.inner.read_dir(&self.full_name("read_dir", name)?)
    }

    fn stat(&self, name: &str) -> XplatResult<FileInfo> {
        self.inner.stat(&self.full_name("stat", name)?)
    }

    fn exists(&self, name: &str) -> XplatResult<bool> {
        self.inner.exists(&self.full_name("exists", name)?)
    }

    fn mkdir(&self, name: &str, perm: FileMode) -> XplatResult<()> {
        self.inner.mkdir(&self.full_name("mkdir", name)?, perm)
    }

    fn mkdir_all(&self, name: &str, perm: FileMode) -> XplatResult<()> {
        self.inner.mkdir_all(&self.full_name("mkdir_all", name)?, perm)
    }

    fn remove(&self, name: &str) -> XplatResult<()> {
        self.inner.remove(&self.full_name("remove", name)?)
    }

    fn remove_all(&self, name: &str) -> XplatResult<()> {
        self.inner.remove_all(&self.full_name("remove_all", name)?)
    }

    fn rename(&self, old_name: &str, new_name: &str) -> XplatResult<()> {
        self.inner.rename(
            &self.full_name("rename", old_name)?,
            &self.full_name("rename", new_name)?,
        )
    }

    fn glob(&self, pattern: &str) -> XplatResult<Vec<String>> {
        let full_pattern = self.full_name("glob", pattern)?;
        let processor = self.inner.processor();
        let mut matches = self
            .inner
            .glob(&full_pattern)?
            .iter()
            .map(|name| processor.rel(&self.dir, name))
            .collect::<XplatResult<Vec<_>>>()?;
        matches.sort();
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pal::MemoryFs;
    use crate::platform::Platform;

    const DIR_PERM: FileMode = FileMode::new(0o755);
    const FILE_PERM: FileMode = FileMode::new(0o644);

    fn project() -> (MemoryFs, SubFs<MemoryFs>) {
        let fs = MemoryFs::for_platform(Platform::Linux);
        fs.mkdir_all("/project/src", DIR_PERM).unwrap();
        fs.write_file("/project/src/lib.rs", b"lib", FILE_PERM).unwrap();
        fs.write_file("/project/Cargo.toml", b"toml", FILE_PERM).unwrap();
        fs.write_file("/outside", b"secret", FILE_PERM).unwrap();
        let sub = fs.sub("/project").unwrap();
        (fs, sub)
    }

    #[test]
    fn test_reads_through_view() {
        let (_, sub) = project();
        assert_eq!(sub.dir(), "/project");
        assert_eq!(sub.read_file("src/lib.rs").unwrap(), b"lib");
        assert_eq!(sub.read_file("./src/../Cargo.toml").unwrap(), b"toml");
        let names: Vec<_> = sub.read_dir(".").unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Cargo.toml", "src"]);
    }

    #[test]
    fn test_writes_land_in_inner() {
        let (fs, sub) = project();
        sub.mkdir("docs", DIR_PERM).unwrap();
        sub.write_file("docs/readme.md", b"# hi", FILE_PERM).unwrap();
        assert_eq!(fs.read_file("/project/docs/readme.md").unwrap(), b"# hi");
    }

    #[test]
    fn test_rejects_escaping_names() {
        let (_, sub) = project();
        for name in ["../outside", "src/../../outside", "/outside"] {
            let error = sub.read_file(name).unwrap_err();
            assert!(
                matches!(error.kind(), ErrorKind::InvalidOperation { .. }),
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_glob_is_relative_to_view() {
        let (_, sub) = project();
        assert_eq!(sub.glob("src/*.rs").unwrap(), vec!["src/lib.rs"]);
        assert_eq!(sub.glob("*").unwrap(), vec!["Cargo.toml", "src"]);
    }

    #[test]
    fn test_sub_requires_directory() {
        let (fs, _) = project();
        assert!(fs.sub("/missing").unwrap_err().is_not_exist());
        assert!(matches!(
            fs.sub("/outside").unwrap_err().kind(),
            ErrorKind::InvalidOperation { .. }
        ));
    }

    #[test]
    fn test_nested_sub() {
        let (_, sub) = project();
        let src = sub.sub("src").unwrap();
        assert_eq!(src.read_file("lib.rs").unwrap(), b"lib");
        assert!(src.read_file("../Cargo.toml").is_err());
    }

    #[test]
    fn test_windows_view() {
        let fs = MemoryFs::for_platform(Platform::Windows);
        fs.mkdir_all(r"c:\Users\fake", DIR_PERM).unwrap();
        fs.write_file(r"c:\Users\fake\notes.txt", b"n", FILE_PERM).unwrap();
        let home = fs.sub(r"C:\users\FAKE").unwrap();
        assert!(home.exists("NOTES.TXT").unwrap());
        assert_eq!(home.glob("*.txt").unwrap(), vec!["notes.txt"]);
        assert!(home.read_file(r"..\..\x").is_err());
        assert!(home.read_file(r"d:\x").is_err());
    }
}
