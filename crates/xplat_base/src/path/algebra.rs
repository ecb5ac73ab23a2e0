use crate::error::{XplatError, XplatResult};

use super::file_path::{
    CURRENT_DIRECTORY, Comparison, FORWARD_SLASH, FilePath, PARENT_DIRECTORY, Volume,
};

impl FilePath {
    /// Same volume and rootedness, no segments.
    pub fn root(&self) -> FilePath {
        FilePath {
            volume: self.volume.clone(),
            absolute: self.absolute,
            segments: Vec::new(),
        }
    }

    /// Appends `other`'s segments, keeping this path's volume and rootedness.
    ///
    /// The result is not cleaned.
    pub fn join(&self, other: &FilePath) -> FilePath {
        let mut segments = Vec::with_capacity(self.segments.len() + other.segments.len());
        segments.extend(self.segments.iter().cloned());
        segments.extend(other.segments.iter().cloned());
        FilePath {
            volume: self.volume.clone(),
            absolute: self.absolute,
            segments,
        }
    }

    /// Lexically normalizes the path.
    ///
    /// `.` and empty segments are dropped and `..` cancels the segment before it.
    /// Leading `..` survive on relative paths and vanish on absolute ones. An
    /// empty relative result becomes `.`.
    pub fn clean(&self) -> FilePath {
        let mut clean = self.clean_segments();
        if clean.segments.is_empty() && clean.is_rel() {
            clean.segments.push(CURRENT_DIRECTORY.to_string());
        }
        clean
    }

    fn clean_segments(&self) -> FilePath {
        if self.segments.is_empty() {
            return self.clone();
        }

        // `\\host\share\` is already the canonical share root
        if self.is_unc() && self.segments.len() == 1 && self.segments[0].is_empty() {
            return self.clone();
        }

        let mut stack: Vec<String> = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            match segment.as_str() {
                "" | CURRENT_DIRECTORY => continue,
                PARENT_DIRECTORY => match stack.pop() {
                    Some(previous) if previous == PARENT_DIRECTORY => {
                        stack.push(previous);
                        stack.push(PARENT_DIRECTORY.to_string());
                    }
                    Some(_) => {}
                    None if self.is_rel() => stack.push(PARENT_DIRECTORY.to_string()),
                    None => {}
                },
                _ => stack.push(segment.clone()),
            }
        }

        FilePath {
            volume: self.volume.clone(),
            absolute: self.absolute,
            segments: stack,
        }
    }

    /// Structural equality under the given case policy.
    pub fn equal(&self, other: &FilePath, cmp: Comparison) -> bool {
        self.absolute == other.absolute
            && self.volume.equal(&other.volume, cmp)
            && self.segments.len() == other.segments.len()
            && self
                .segments
                .iter()
                .zip(&other.segments)
                .all(|(left, right)| cmp.equal(left, right))
    }

    /// Computes a relative path that leads from `self` to `target`.
    ///
    /// Purely lexical: fails when one side is absolute and the other is not, when
    /// absolute volumes differ, or when the walk would have to climb out of a
    /// `..` segment of `self` whose meaning is unknown.
    pub fn rel(&self, target: &FilePath, cmp: Comparison) -> XplatResult<FilePath> {
        let mut source = self.clean();
        let target = target.clean();

        if source.equal(&target, cmp) {
            return Ok(FilePath::relative([CURRENT_DIRECTORY]));
        }

        if source.segments.len() == 1 && source.segments[0] == CURRENT_DIRECTORY {
            source.segments.clear();
        }

        if source.absolute != target.absolute {
            return Err(Box::new(XplatError::relative(
                source.render(FORWARD_SLASH),
                target.render(FORWARD_SLASH),
                "absolute and relative paths can't be mixed",
            )));
        }
        if !source.volume.equal(&target.volume, cmp) {
            return Err(Box::new(XplatError::relative(
                source.render(FORWARD_SLASH),
                target.render(FORWARD_SLASH),
                "paths are on different volumes",
            )));
        }

        let first_diff = source
            .segments
            .iter()
            .zip(&target.segments)
            .position(|(left, right)| !cmp.equal(left, right))
            .unwrap_or_else(|| source.segments.len().min(target.segments.len()));

        if source
            .segments
            .get(first_diff)
            .is_some_and(|segment| segment == PARENT_DIRECTORY)
        {
            return Err(Box::new(XplatError::relative(
                source.render(FORWARD_SLASH),
                target.render(FORWARD_SLASH),
                "source climbs through '..' that can't be resolved lexically",
            )));
        }

        let mut segments: Vec<String> = source.segments[first_diff..]
            .iter()
            .map(|_| PARENT_DIRECTORY.to_string())
            .collect();
        if first_diff < target.segments.len() {
            segments.extend(target.segments[first_diff..].iter().cloned());
        }

        Ok(FilePath {
            volume: Volume::default(),
            absolute: false,
            segments,
        })
    }

    /// The path without its last element, cleaned.
    pub fn dir(&self) -> FilePath {
        let mut dir = self.clone();
        if let Some(last) = dir.segments.last_mut() {
            last.clear();
        }
        dir.clean()
    }

    /// The last element, ignoring trailing separators.
    ///
    /// A rooted path without elements yields the bare root (rendered as a single
    /// separator), anything else without elements yields `.`.
    pub fn base(&self) -> FilePath {
        match self.segments.iter().rev().find(|segment| !segment.is_empty()) {
            Some(segment) => FilePath::relative([segment.as_str()]),
            None if self.absolute => FilePath {
                volume: Volume::default(),
                absolute: true,
                segments: Vec::new(),
            },
            None => FilePath::relative([CURRENT_DIRECTORY]),
        }
    }

    /// Suffix of the final segment starting at its last `.`, or `""`.
    pub fn ext(&self) -> &str {
        self.segments
            .last()
            .and_then(|last| last.rfind('.').map(|index| &last[index..]))
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::file_path::BACKWARD_SLASH;

    fn rel_path(segments: &[&str]) -> FilePath {
        FilePath::relative(segments.iter().copied())
    }

    fn abs_path(segments: &[&str]) -> FilePath {
        FilePath::new(
            Volume::default(),
            true,
            segments.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_clean_collapses_dot_and_empty() {
        let path = rel_path(&["abc", "", ".", "def", ""]);
        assert_eq!(path.clean().segments, vec!["abc", "def"]);
    }

    #[test]
    fn test_clean_parent_on_relative_is_kept() {
        assert_eq!(rel_path(&["..", "..", "abc"]).clean().segments, vec!["..", "..", "abc"]);
        assert_eq!(rel_path(&["abc", "..", "..", ".."]).clean().segments, vec!["..", ".."]);
    }

    #[test]
    fn test_clean_parent_on_absolute_is_dropped() {
        assert!(abs_path(&["..", ".."]).clean().segments.is_empty());
        assert_eq!(abs_path(&["..", "abc"]).clean().segments, vec!["abc"]);
    }

    #[test]
    fn test_clean_empty_relative_is_current_directory() {
        assert_eq!(rel_path(&[]).clean().segments, vec!["."]);
        assert_eq!(rel_path(&["a", ".."]).clean().segments, vec!["."]);
    }

    #[test]
    fn test_clean_keeps_unc_share_root() {
        let path = FilePath::new(Volume::unc("abc", Some(String::new())), true, vec![String::new()]);
        assert_eq!(path.clean(), path);
    }

    #[test]
    fn test_clean_is_idempotent() {
        let path = rel_path(&["abc", "..", "..", "def", ".", "", "ghi", ".."]);
        let once = path.clean();
        assert_eq!(once.clean(), once);
    }

    #[test]
    fn test_join_keeps_left_volume() {
        let left = FilePath::new(Volume::drive("c:"), true, vec!["a".into()]);
        let joined = left.join(&abs_path(&["b", "c"]));
        assert_eq!(joined.volume, Volume::drive("c:"));
        assert!(joined.absolute);
        assert_eq!(joined.segments, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_join_does_not_clean() {
        let joined = rel_path(&["a", ""]).join(&rel_path(&["..", "b"]));
        assert_eq!(joined.segments, vec!["a", "", "..", "b"]);
    }

    #[test]
    fn test_join_is_associative_before_clean() {
        let a = rel_path(&["a", ".."]);
        let b = rel_path(&["", "b"]);
        let c = rel_path(&["c", "."]);
        assert_eq!(a.join(&b).join(&c).segments, a.join(&b.join(&c)).segments);
    }

    #[test]
    fn test_root() {
        let root = FilePath::new(Volume::drive("c:"), true, vec!["a".into()]).root();
        assert!(root.segments.is_empty());
        assert_eq!(root.render(BACKWARD_SLASH), r"c:\");
    }

    #[test]
    fn test_equal_case_policy() {
        let upper = abs_path(&["A", "B"]);
        let lower = abs_path(&["a", "b"]);
        assert!(upper.equal(&lower, Comparison::IgnoreCase));
        assert!(!upper.equal(&lower, Comparison::CaseSensitive));
        assert!(!upper.equal(&rel_path(&["A", "B"]), Comparison::IgnoreCase));
        assert!(!upper.equal(&abs_path(&["A"]), Comparison::IgnoreCase));
    }

    #[test]
    fn test_rel_descends() {
        let rel = abs_path(&["a", "b"])
            .rel(&abs_path(&["a", "b", "c", "d"]), Comparison::CaseSensitive)
            .unwrap();
        assert_eq!(rel, rel_path(&["c", "d"]));
    }

    #[test]
    fn test_rel_ascends() {
        let rel = abs_path(&["a", "b", "c", "d"])
            .rel(&abs_path(&["a", "b"]), Comparison::CaseSensitive)
            .unwrap();
        assert_eq!(rel, rel_path(&["..", ".."]));
    }

    #[test]
    fn test_rel_case_insensitive_prefix() {
        let rel = abs_path(&["A", "B"])
            .rel(&abs_path(&["a", "b", "c"]), Comparison::IgnoreCase)
            .unwrap();
        assert_eq!(rel, rel_path(&["c"]));
    }

    #[test]
    fn test_rel_mixed_absoluteness_fails() {
        let result = abs_path(&["a"]).rel(&rel_path(&["a"]), Comparison::CaseSensitive);
        assert!(matches!(
            result.unwrap_err().kind(),
            crate::error::ErrorKind::Relative { .. }
        ));
    }

    #[test]
    fn test_rel_different_volumes_fails() {
        let c = FilePath::new(Volume::drive("c:"), true, vec!["a".into()]);
        let d = FilePath::new(Volume::drive("d:"), true, vec!["a".into()]);
        assert!(c.rel(&d, Comparison::IgnoreCase).is_err());
    }

    #[test]
    fn test_rel_unresolvable_parent_fails() {
        let result = rel_path(&["..", "a"]).rel(&rel_path(&["b"]), Comparison::CaseSensitive);
        assert!(result.is_err());
    }

    #[test]
    fn test_rel_inverse() {
        let source = abs_path(&["a", "b", "c"]);
        let target = abs_path(&["a", "x", "y"]);
        let rel = source.rel(&target, Comparison::CaseSensitive).unwrap();
        assert_eq!(source.join(&rel).clean(), target.clean());
    }

    #[test]
    fn test_dir() {
        assert_eq!(rel_path(&["a", "b"]).dir(), rel_path(&["a"]));
        assert_eq!(rel_path(&["a"]).dir(), rel_path(&["."]));
        assert_eq!(rel_path(&["a", "b", ""]).dir(), rel_path(&["a", "b"]));
        assert_eq!(abs_path(&["a"]).dir(), abs_path(&[]));
    }

    #[test]
    fn test_base() {
        assert_eq!(rel_path(&["a", "b"]).base(), rel_path(&["b"]));
        assert_eq!(rel_path(&["a", "b", ""]).base(), rel_path(&["b"]));
        assert_eq!(rel_path(&[]).base(), rel_path(&["."]));
        assert_eq!(abs_path(&[]).base().render(BACKWARD_SLASH), r"\");
    }

    #[test]
    fn test_ext() {
        assert_eq!(rel_path(&["dir.d", "file.tar.gz"]).ext(), ".gz");
        assert_eq!(rel_path(&["dir.d", "file"]).ext(), "");
        assert_eq!(rel_path(&[]).ext(), "");
    }
}
