use crate::error::XplatResult;
use crate::pal::{Os, OsHandle, RealOs};
use crate::platform::Platform;

use super::file_path::{BACKWARD_SLASH, CURRENT_DIRECTORY, Comparison, FORWARD_SLASH, FilePath};
use super::parser::Parser;

/* 📖 # Why one Processor instead of free functions?

Every string-level path operation needs the same three decisions: how to split
(parser), how to render (separator) and how to compare (case policy). `abs` also
needs a working directory. Bundling them in one value means a caller configures
"Windows paths, rendered with `\`, case-insensitive, working directory from this
mock" once and passes that around, instead of threading four arguments through
every call.
*/

/// String-level path operations for one platform.
///
/// ```
/// use xplat_base::path::Processor;
/// use xplat_base::platform::Platform;
///
/// let windows = Processor::new(Platform::Windows);
/// assert_eq!(windows.clean("c:/foo/../bar").unwrap(), r"c:\bar");
/// assert_eq!(windows.join(&[r"c:\", r"a\b", "c"]).unwrap(), r"c:\a\b\c");
/// ```
#[derive(Debug, Clone)]
pub struct Processor {
    platform: Platform,
    parser: Parser,
    separator: char,
    comparison: Comparison,
    os: OsHandle,
}

impl Processor {
    pub fn new(platform: Platform) -> Self {
        let (separator, comparison) = if platform.is_unix() {
            (FORWARD_SLASH, Comparison::CaseSensitive)
        } else {
            (BACKWARD_SLASH, Comparison::IgnoreCase)
        };
        Self {
            platform,
            parser: Parser::new(platform),
            separator,
            comparison,
            os: OsHandle::new(RealOs::new()),
        }
    }

    /// Processor for the platform the collaborator reports, resolving relative
    /// paths against its working directory.
    pub fn from_os(os: OsHandle) -> Self {
        Self::new(os.platform()).with_os(os)
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }

    pub fn with_parser(mut self, parser: Parser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_os(mut self, os: OsHandle) -> Self {
        self.os = os;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    pub fn os(&self) -> &dyn Os {
        &*self.os
    }

    pub fn parse(&self, path: &str) -> XplatResult<FilePath> {
        self.parser.parse(path)
    }

    pub fn render(&self, path: &FilePath) -> String {
        path.render(self.separator)
    }

    pub fn is_abs(&self, path: &str) -> XplatResult<bool> {
        Ok(self.parse(path)?.is_abs())
    }

    /// Joins the non-empty elements and cleans the result.
    ///
    /// Later elements are appended even when absolute; only the first element
    /// decides the volume and rootedness.
    pub fn join(&self, elements: &[&str]) -> XplatResult<String> {
        let mut accumulator: Option<FilePath> = None;
        for element in elements.iter().filter(|element| !element.is_empty()) {
            let next = self.parse(element)?;
            accumulator = Some(match accumulator {
                Some(path) => path.join(&next),
                None => next,
            });
        }
        Ok(accumulator
            .map(|path| self.render(&path.clean()))
            .unwrap_or_default())
    }

    pub fn clean(&self, path: &str) -> XplatResult<String> {
        let path = self.parse(path)?;
        Ok(self.render(&self.clean_path(&path)))
    }

    /// [`FilePath::clean`], plus a leading `.` on Windows when the first segment
    /// of a relative result would otherwise read as a drive (`a/../c:` → `.\c:`).
    pub fn clean_path(&self, path: &FilePath) -> FilePath {
        let mut clean = path.clean();
        if self.parser.platform().is_windows()
            && clean.is_rel()
            && clean.segments.first().is_some_and(|first| looks_like_drive(first))
        {
            clean.segments.insert(0, CURRENT_DIRECTORY.to_string());
        }
        clean
    }

    pub fn rel(&self, source: &str, target: &str) -> XplatResult<String> {
        let source = self.parse(source)?;
        let target = self.parse(target)?;
        let rel = source.rel(&target, self.comparison)?;
        Ok(self.render(&rel))
    }

    pub fn root(&self, path: &str) -> XplatResult<String> {
        Ok(self.render(&self.parse(path)?.root()))
    }

    pub fn volume_name(&self, path: &str) -> XplatResult<String> {
        Ok(self.parse(path)?.volume_name(self.separator))
    }

    pub fn dir(&self, path: &str) -> XplatResult<String> {
        Ok(self.render(&self.parse(path)?.dir()))
    }

    pub fn base(&self, path: &str) -> XplatResult<String> {
        Ok(self.render(&self.parse(path)?.base()))
    }

    pub fn ext(&self, path: &str) -> XplatResult<String> {
        Ok(self.parse(path)?.ext().to_string())
    }

    /// Resolves `path` against the collaborator's working directory.
    pub fn abs(&self, path: &str) -> XplatResult<String> {
        let path = self.parse(path)?;
        if path.is_abs() {
            return Ok(self.render(&path.clean()));
        }
        let working_directory = self.parse(&self.os.working_directory()?)?;
        Ok(self.render(&working_directory.join(&path).clean()))
    }

    /// Splits a `PATH`-style list and cleans every element.
    pub fn split_list(&self, list: &str) -> XplatResult<Vec<String>> {
        Ok(self
            .parser
            .parse_list(list)?
            .iter()
            .map(|path| self.render(&self.clean_path(path)))
            .collect())
    }
}

fn looks_like_drive(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::pal::MockOs;

    fn windows() -> Processor {
        Processor::new(Platform::Windows)
    }

    fn linux() -> Processor {
        Processor::new(Platform::Linux)
    }

    #[test]
    fn test_defaults_per_platform() {
        assert_eq!(linux().separator(), '/');
        assert_eq!(linux().comparison(), Comparison::CaseSensitive);
        assert_eq!(windows().separator(), '\\');
        assert_eq!(windows().comparison(), Comparison::IgnoreCase);
    }

    #[test]
    fn test_join() {
        let cases: &[(&[&str], &str)] = &[
            (&["a", "b", "c"], "a/b/c"),
            (&["a", "b/c"], "a/b/c"),
            (&["a/b", "c"], "a/b/c"),
            (&["a/b", "/c"], "a/b/c"),
            (&["/a/b", "/c"], "/a/b/c"),
            (&["a", "", "b"], "a/b"),
            (&["a", "../../b"], "../b"),
            (&["dir", "c:file"], "dir/c:file"),
            (&["c:", "x"], "c:/x"),
        ];
        for (elements, expected) in cases {
            assert_eq!(&linux().join(elements).unwrap(), expected, "{:?}", elements);
        }
        assert_eq!(windows().join(&[r"c:\", r"a\b", "c"]).unwrap(), r"c:\a\b\c");
    }

    #[test]
    fn test_join_nothing() {
        assert_eq!(linux().join(&[]).unwrap(), "");
        assert_eq!(linux().join(&["", ""]).unwrap(), "");
    }

    #[test]
    fn test_clean_posix() {
        let cases = [
            ("abc", "abc"),
            ("a/b/c", "a/b/c"),
            (".", "."),
            ("..", ".."),
            ("../../abc", "../../abc"),
            ("/abc", "/abc"),
            ("/", "/"),
            ("", "."),
            ("abc/", "abc"),
            ("./", "."),
            ("../../", "../.."),
            ("/abc/", "/abc"),
            ("abc//def//ghi", "abc/def/ghi"),
            ("abc/./def", "abc/def"),
            ("/./abc/def", "/abc/def"),
            ("abc/def/ghi/../jkl", "abc/def/jkl"),
            ("abc/def/../ghi/../jkl", "abc/jkl"),
            ("abc/def/../..", "."),
            ("/abc/def/../..", "/"),
            ("abc/def/../../..", ".."),
            ("/abc/def/../../..", "/"),
            ("abc/def/../../../ghi/jkl/../../../mno", "../../mno"),
            ("/../abc", "/abc"),
            ("/..", "/"),
            ("abc/./../def", "def"),
            ("abc/../../././../def", "../../def"),
        ];
        for (path, expected) in cases {
            assert_eq!(linux().clean(path).unwrap(), expected, "clean({:?})", path);
        }
    }

    #[test]
    fn test_clean_windows() {
        let cases = [
            (r"c:", r"c:."),
            (r"c:\", r"c:\"),
            (r"c:\abc", r"c:\abc"),
            (r"c:abc\..\..\.\.\..\def", r"c:..\..\def"),
            (r"c:\abc\def\..\..", r"c:\"),
            (r"c:\..\abc", r"c:\abc"),
            (r"c:..\abc", r"c:..\abc"),
            (r"\", r"\"),
            (r"/", r"\"),
            (r"\\i\..\c$", r"\\i\..\c$"),
            (r"\\i\..\I\c$", r"\\i\..\I\c$"),
            (r"\\host\share\foo\..\bar", r"\\host\share\bar"),
            (r"//host/share/foo/../baz", r"\\host\share\baz"),
            (r"\\host\share\foo\..\..\..\..\bar", r"\\host\share\bar"),
            (r"\\.\C:\a\..\..\..\..\bar", r"\\.\C:\bar"),
            (r"\\.\C:\\\\a", r"\\.\C:\a"),
            (r"\\a\b", r"\\a\b"),
            (r".\c:", r".\c:"),
            (r".\c:\foo", r".\c:\foo"),
            (r".\c:foo", r".\c:foo"),
            (r"//abc", r"\\abc"),
            (r"///abc", r"\\\abc"),
            (r"//abc//", r"\\abc\\"),
            (r"a/../c:", r".\c:"),
            (r"a\..\c:", r".\c:"),
            (r"a/../c:/a", r".\c:\a"),
            (r"a/../../c:", r"..\c:"),
            (r"foo:bar", r"foo:bar"),
        ];
        for (path, expected) in cases {
            assert_eq!(windows().clean(path).unwrap(), expected, "clean({:?})", path);
        }
    }

    #[test]
    fn test_clean_with_forward_slash_on_windows() {
        let processor = windows().with_separator('/');
        assert_eq!(processor.clean(r"c:\a\..\b").unwrap(), "c:/b");
        assert_eq!(processor.clean(r"\\host\share\x").unwrap(), "//host/share/x");
    }

    #[test]
    fn test_rel() {
        let cases = [
            ("a/b", "a/b", "."),
            ("a/b/.", "a/b", "."),
            ("a/b", "a/b/.", "."),
            ("./a/b", "a/b", "."),
            ("a/b", "./a/b", "."),
            ("ab/cd", "ab/cde", "../cde"),
            ("ab/cd", "ab/c", "../c"),
            ("a/b", "a/b/c/d", "c/d"),
            ("a/b", "a/b/../c", "../c"),
            ("a/b/../c", "a/b", "../b"),
            ("a/b/c", "a/c/d", "../../c/d"),
            ("a/b", "c/d", "../../c/d"),
            ("a/b/c/d", "a/b", "../.."),
            ("a/b/c/d", "a/b/", "../.."),
            ("a/b/c/d/", "a/b", "../.."),
            ("a/b/c/d/", "a/b/", "../.."),
            ("../../a/b", "../../a/b/c/d", "c/d"),
            ("/a/b", "/a/b", "."),
            ("/a/b/.", "/a/b", "."),
            ("/ab/cd", "/ab/cde", "../cde"),
            ("/a/b", "/a/b/c/d", "c/d"),
            ("/a/b", "/a/b/../c", "../c"),
            ("/a/b/../c", "/a/b", "../b"),
            ("/a/b/c", "/a/c/d", "../../c/d"),
            ("/a/b", "/c/d", "../../c/d"),
            ("/a/b/c/d/", "/a/b/", "../.."),
            ("/../../a/b", "/../../a/b/c/d", "c/d"),
            (".", "a/b", "a/b"),
            (".", "..", ".."),
        ];
        for (source, target, expected) in cases {
            assert_eq!(
                linux().rel(source, target).unwrap(),
                expected,
                "rel({:?}, {:?})",
                source,
                target
            );
        }
    }

    #[test]
    fn test_rel_windows() {
        assert_eq!(windows().rel(r"C:\Users", r"c:\users\fake\bin").unwrap(), r"fake\bin");
        assert_eq!(
            windows().rel(r"\\host\share\a", r"\\HOST\share\b").unwrap(),
            r"..\b"
        );
        assert!(windows().rel(r"c:\a", r"d:\a").is_err());
    }

    #[test]
    fn test_rel_errors() {
        for (source, target) in [("/a", "a"), ("a", "/a"), ("../a", "b"), ("..", "a")] {
            let error = linux().rel(source, target).unwrap_err();
            assert!(
                matches!(error.kind(), ErrorKind::Relative { .. }),
                "rel({:?}, {:?})",
                source,
                target
            );
        }
    }

    #[test]
    fn test_rel_is_case_sensitive_on_unix() {
        assert_eq!(linux().rel("/A/b", "/a/b").unwrap(), "../../a/b");
    }

    #[test]
    fn test_root() {
        let forward = windows().with_separator('/');
        assert_eq!(forward.root("//host/share/gran/parent/child").unwrap(), "//host/share");
        assert_eq!(windows().root(r"\\host\share\gran\parent\child").unwrap(), r"\\host\share");
        assert_eq!(linux().root("/gran/parent/child").unwrap(), "/");
        assert_eq!(windows().root(r"c:\gran\parent\child").unwrap(), r"c:\");
        assert_eq!(windows().root(r"c:gran").unwrap(), "c:");
        assert_eq!(linux().root("gran/parent").unwrap(), "");
    }

    #[test]
    fn test_volume_name() {
        assert_eq!(windows().volume_name(r"c:\foo\bar").unwrap(), "c:");
        assert_eq!(windows().volume_name("c:").unwrap(), "c:");
        assert_eq!(windows().volume_name(r"\\host\share\foo").unwrap(), r"\\host\share");
        assert_eq!(
            windows().with_separator('/').volume_name(r"\\host\share\foo").unwrap(),
            "//host/share"
        );
        assert_eq!(windows().volume_name(r"\\.\NUL").unwrap(), r"\\.\NUL");
        assert_eq!(windows().volume_name(r"foo\bar").unwrap(), "");
        assert_eq!(linux().volume_name("//host/share/foo").unwrap(), "");
    }

    #[test]
    fn test_dir() {
        assert_eq!(linux().dir("/gran/parent/child").unwrap(), "/gran/parent");
        assert_eq!(linux().dir("/gran/parent/").unwrap(), "/gran/parent");
        assert_eq!(linux().dir("child").unwrap(), ".");
        assert_eq!(linux().dir("/child").unwrap(), "/");
        assert_eq!(linux().dir("").unwrap(), ".");
        assert_eq!(windows().dir(r"c:\gran\parent").unwrap(), r"c:\gran");
    }

    #[test]
    fn test_base() {
        assert_eq!(linux().base("/gran/parent/child").unwrap(), "child");
        assert_eq!(linux().base("/gran/parent/").unwrap(), "parent");
        assert_eq!(linux().base("").unwrap(), ".");
        assert_eq!(linux().base("/").unwrap(), "/");
        assert_eq!(linux().base("//").unwrap(), "/");
        assert_eq!(windows().base(r"c:\").unwrap(), r"\");
        assert_eq!(windows().base(r"c:\gran\file.txt").unwrap(), "file.txt");
    }

    #[test]
    fn test_ext() {
        assert_eq!(linux().ext("/gran/file.tar.gz").unwrap(), ".gz");
        assert_eq!(linux().ext("/gran.d/file").unwrap(), "");
        assert_eq!(linux().ext("file.").unwrap(), ".");
        assert_eq!(windows().ext(r"c:\ProgramData\test\fake.exe").unwrap(), ".exe");
    }

    #[test]
    fn test_abs_uses_working_directory() {
        let linux = Processor::from_os(OsHandle::new(MockOs::linux()));
        assert_eq!(linux.abs("a/../b").unwrap(), "/working/b");
        assert_eq!(linux.abs("/etc/./hosts").unwrap(), "/etc/hosts");
        assert_eq!(linux.abs("").unwrap(), "/working");

        let windows = Processor::from_os(OsHandle::new(MockOs::windows()));
        assert_eq!(windows.platform(), Platform::Windows);
        assert_eq!(windows.abs(r"bin\tool.exe").unwrap(), r"c:\working\bin\tool.exe");
        assert_eq!(windows.abs(r"d:\x\..\y").unwrap(), r"d:\y");
    }

    #[test]
    fn test_is_abs() {
        assert!(linux().is_abs("/a").unwrap());
        assert!(!linux().is_abs("a").unwrap());
        assert!(windows().is_abs(r"c:\a").unwrap());
        assert!(!windows().is_abs("c:a").unwrap());
        assert!(windows().is_abs(r"\\host\share").unwrap());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            linux().split_list("/usr/bin:/usr/local/../bin").unwrap(),
            vec!["/usr/bin", "/usr/bin"]
        );
        assert_eq!(
            windows().split_list(r"c:\bin;C:/Tools/").unwrap(),
            vec![r"c:\bin", r"C:\Tools"]
        );
    }

    #[test]
    fn test_nul_propagates_as_invalid_path() {
        let error = linux().clean("a\0").unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::InvalidPath { .. }));
        assert!(linux().join(&["a", "b\0"]).is_err());
    }
}
