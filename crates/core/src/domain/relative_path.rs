use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::{DomainError, EntryName};

/// A `/`-separated path below the upload root.
///
/// Parsing is purely lexical: empty and `.` segments are dropped, a leading
/// separator is ignored and any `..` segment is rejected, so a parsed value
/// can never point outside the directory it is joined onto.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RelativePath {
    segments: Vec<String>,
}

impl RelativePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let mut segments = Vec::new();

        for segment in raw.split(['/', '\\']) {
            match segment {
                "" | "." => continue,
                ".." => return Err(DomainError::InvalidPath(raw.to_string())),
                s if s.contains('\0') => return Err(DomainError::InvalidPath(raw.to_string())),
                s => segments.push(s.to_string()),
            }
        }

        Ok(Self { segments })
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    /// Proper prefixes of this path, outermost first. Neither the root nor
    /// the path itself is yielded.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + '_ {
        (1..self.segments.len()).map(|len| Self {
            segments: self.segments[..len].to_vec(),
        })
    }

    #[must_use]
    pub fn join(&self, name: &EntryName) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.as_str().to_string());
        Self { segments }
    }

    #[must_use]
    pub fn join_relative(&self, other: &RelativePath) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// Absolute location of this path under `root`.
    pub fn to_path_under(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(&self.segments);
        path
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl FromStr for RelativePath {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
