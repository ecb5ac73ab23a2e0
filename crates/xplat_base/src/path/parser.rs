use crate::error::{XplatError, XplatResult};
use crate::platform::Platform;

use super::file_path::{BACKWARD_SLASH, COLON, FORWARD_SLASH, FilePath, SEMICOLON, Volume};

/* 📖 # Why is the parser bound to a platform?

`\\host\share` is a UNC root on Windows but a relative name made of backslashes on
Linux, and `a:b:c` is a search list on Linux but a drive-relative path on Windows.
The platform picks the separator set and the list separator. Drive letters and
UNC prefixes are only recognized on Windows; elsewhere `c:file` is an ordinary
file name.
*/

/// Platform-aware tokenizer turning strings into [`FilePath`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parser {
    platform: Platform,
    separators: Vec<char>,
    list_separator: char,
}

impl Parser {
    pub fn new(platform: Platform) -> Self {
        if platform.is_unix() {
            Self {
                platform,
                separators: vec![FORWARD_SLASH],
                list_separator: COLON,
            }
        } else {
            Self {
                platform,
                separators: vec![BACKWARD_SLASH, FORWARD_SLASH],
                list_separator: SEMICOLON,
            }
        }
    }

    pub fn with_separators(mut self, separators: impl IntoIterator<Item = char>) -> Self {
        self.separators = separators.into_iter().collect();
        self
    }

    pub fn with_list_separator(mut self, list_separator: char) -> Self {
        self.list_separator = list_separator;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn separators(&self) -> &[char] {
        &self.separators
    }

    pub fn list_separator(&self) -> char {
        self.list_separator
    }

    pub fn is_separator(&self, c: char) -> bool {
        self.separators.contains(&c)
    }

    /// Parses a single path.
    ///
    /// Fails only for input containing a NUL character.
    pub fn parse(&self, path: &str) -> XplatResult<FilePath> {
        if path.contains('\0') {
            return Err(Box::new(XplatError::invalid_path(
                path,
                "path contains a NUL character",
            )));
        }
        if self.is_unc(path) {
            return Ok(self.parse_unc(path));
        }
        if self.platform.is_windows() && is_drive(path) {
            return Ok(self.parse_drive(path));
        }
        Ok(self.parse_posix(path))
    }

    /// Parses a `PATH`-style list. Every element is parsed, including empty ones.
    pub fn parse_list(&self, list: &str) -> XplatResult<Vec<FilePath>> {
        list.split(self.list_separator)
            .map(|element| self.parse(element))
            .collect()
    }

    fn is_unc(&self, path: &str) -> bool {
        let mut chars = path.chars();
        self.platform.is_windows()
            && path.chars().nth(2).is_some()
            && chars.next().is_some_and(|c| self.is_separator(c))
            && chars.next().is_some_and(|c| self.is_separator(c))
    }

    fn parse_unc(&self, path: &str) -> FilePath {
        let start = path.char_indices().nth(2).map_or(path.len(), |(index, _)| index);
        let mut elements = self.split(&path[start..]).into_iter();
        let host = elements.next();
        let share = elements.next();
        FilePath {
            volume: Volume {
                drive: None,
                host,
                share,
            },
            absolute: true,
            segments: elements.collect(),
        }
    }

    fn parse_drive(&self, path: &str) -> FilePath {
        let (drive, rest) = path.split_at(2);
        let mut segments = self.split(rest);
        if segments.len() > 1 && segments[0].is_empty() {
            segments.remove(0);
        }
        FilePath {
            volume: Volume::drive(drive),
            absolute: rest.chars().next().is_some_and(|c| self.is_separator(c)),
            segments,
        }
    }

    fn parse_posix(&self, path: &str) -> FilePath {
        let absolute = path.chars().next().is_some_and(|c| self.is_separator(c));
        let mut segments = self.split(path);
        if absolute && segments.len() > 1 && segments[0].is_empty() {
            segments.remove(0);
        }
        // "/" alone
        if absolute && segments.len() == 1 && segments[0].is_empty() {
            segments.clear();
        }
        FilePath {
            volume: Volume::default(),
            absolute,
            segments,
        }
    }

    /// Splits on every separator, keeping empty elements. `""` yields nothing.
    fn split(&self, path: &str) -> Vec<String> {
        if path.is_empty() {
            return Vec::new();
        }
        path.split(|c| self.is_separator(c))
            .map(str::to_string)
            .collect()
    }
}

fn is_drive(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
