/* 📖 # Why a structural path instead of string manipulation?

Posix paths, Windows drive paths (`c:\foo`, `c:foo`) and UNC paths (`\\host\share\foo`)
disagree on where the root ends and the components begin. Parsing once into
volume + absolute flag + segments lets clean, join and rel be written once, for every
grammar, as plain operations on a list of strings.
*/

pub const FORWARD_SLASH: char = '/';
pub const BACKWARD_SLASH: char = '\\';
pub const COLON: char = ':';
pub const SEMICOLON: char = ';';

pub const CURRENT_DIRECTORY: &str = ".";
pub const PARENT_DIRECTORY: &str = "..";

/// Whether segments and volumes compare byte-for-byte or case-folded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    CaseSensitive,
    IgnoreCase,
}

impl Comparison {
    pub fn equal(&self, left: &str, right: &str) -> bool {
        match self {
            Comparison::CaseSensitive => left == right,
            Comparison::IgnoreCase => {
                left == right
                    || left
                        .chars()
                        .flat_map(char::to_lowercase)
                        .eq(right.chars().flat_map(char::to_lowercase))
            }
        }
    }

    fn eq_optional(&self, left: Option<&str>, right: Option<&str>) -> bool {
        match (left, right) {
            (None, None) => true,
            (Some(left), Some(right)) => self.equal(left, right),
            _ => false,
        }
    }
}

/// Platform-specific prefix of a path.
///
/// At most one shape is present: `drive` (`c:`), or `host` with an optional
/// `share` (UNC). `Some("")` is a present but empty value and is not the same as
/// `None`: `//abc//` has an empty share, `//abc` has none.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Volume {
    pub drive: Option<String>,
    pub host: Option<String>,
    pub share: Option<String>,
}

impl Volume {
    pub fn drive(drive: impl Into<String>) -> Self {
        Self {
            drive: Some(drive.into()),
            ..Self::default()
        }
    }

    pub fn unc(host: impl Into<String>, share: Option<String>) -> Self {
        Self {
            host: Some(host.into()),
            share,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.drive.is_none() && self.host.is_none() && self.share.is_none()
    }

    pub fn equal(&self, other: &Volume, cmp: Comparison) -> bool {
        cmp.eq_optional(self.drive.as_deref(), other.drive.as_deref())
            && cmp.eq_optional(self.host.as_deref(), other.host.as_deref())
            && cmp.eq_optional(self.share.as_deref(), other.share.as_deref())
    }
}

/// A parsed path: volume, rootedness and the components between separators.
///
/// Segments are kept exactly as split, so `a//b/` holds `["a", "", "b", ""]`
/// until [`FilePath::clean`] is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilePath {
    pub volume: Volume,
    pub absolute: bool,
    pub segments: Vec<String>,
}

impl FilePath {
    pub fn new(volume: Volume, absolute: bool, segments: Vec<String>) -> Self {
        Self {
            volume,
            absolute,
            segments,
        }
    }

    /// A relative path made of the given segments.
    pub fn relative<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            volume: Volume::default(),
            absolute: false,
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_abs(&self) -> bool {
        self.absolute
    }

    pub fn is_rel(&self) -> bool {
        !self.absolute
    }

    pub fn is_drive(&self) -> bool {
        self.volume.drive.is_some()
    }

    pub fn is_unc(&self) -> bool {
        self.volume.host.is_some()
    }

    /// Renders the volume prefix: `c:`, `//host/share` (with `sep`) or nothing.
    pub fn volume_name(&self, sep: char) -> String {
        if let Some(drive) = &self.volume.drive {
            return drive.clone();
        }
        if self.is_unc() {
            let mut name = String::new();
            name.push(sep);
            name.push(sep);
            if let Some(host) = &self.volume.host {
                name.push_str(host);
            }
            if let Some(share) = &self.volume.share {
                name.push(sep);
                name.push_str(share);
            }
            return name;
        }
        String::new()
    }

    /// Renders the path with `sep` between components.
    pub fn render(&self, sep: char) -> String {
        let mut out = self.volume_name(sep);
        if self.absolute && (!self.is_unc() || !self.segments.is_empty()) {
            out.push(sep);
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                out.push(sep);
            }
            out.push_str(segment);
        }
        out
    }
}
