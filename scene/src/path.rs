//! Hierarchical prim paths.
//!
//! A [`ScenePath`] is an absolute, slash-separated identifier such as
//! `/World/Robot/Arm`. The pseudo-root is `/`. Paths order by their string
//! form, which is the order roots are visited in when several subtrees are
//! merged into one traversal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Separator between path segments.
pub const SEPARATOR: char = '/';

/// Errors produced while parsing or building a path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Path is empty")]
    Empty,

    #[error("Path must be absolute: {0}")]
    NotAbsolute(String),

    #[error("Empty segment in path: {0}")]
    EmptySegment(String),

    #[error("Invalid segment '{segment}' in path: {path}")]
    InvalidSegment { path: String, segment: String },
}

/// An absolute path locating a prim on a stage.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScenePath(String);

impl ScenePath {
    /// The pseudo-root path `/`.
    pub fn root() -> Self {
        Self(SEPARATOR.to_string())
    }

    /// Parses and validates an absolute path.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        if text.is_empty() {
            return Err(PathError::Empty);
        }
        if !text.starts_with(SEPARATOR) {
            return Err(PathError::NotAbsolute(text.to_string()));
        }
        if text.len() == 1 {
            return Ok(Self::root());
        }

        for segment in text[1..].split(SEPARATOR) {
            if segment.is_empty() {
                return Err(PathError::EmptySegment(text.to_string()));
            }
            if !is_valid_segment(segment) {
                return Err(PathError::InvalidSegment {
                    path: text.to_string(),
                    segment: segment.to_string(),
                });
            }
        }

        Ok(Self(text.to_string()))
    }

    /// Returns true for the pseudo-root.
    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the last segment. Empty for the root.
    pub fn name(&self) -> &str {
        match self.0.rfind(SEPARATOR) {
            Some(idx) => &self.0[idx + 1..],
            None => "",
        }
    }

    /// Parent path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind(SEPARATOR) {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Builds the path of a child named `name`.
    pub fn append_child(&self, name: &str) -> Result<Self, PathError> {
        let joined = if self.is_root() {
            format!("{}{}", SEPARATOR, name)
        } else {
            format!("{}{}{}", self.0, SEPARATOR, name)
        };
        if name.is_empty() {
            return Err(PathError::EmptySegment(joined));
        }
        if !is_valid_segment(name) {
            return Err(PathError::InvalidSegment {
                path: joined,
                segment: name.to_string(),
            });
        }
        Ok(Self(joined))
    }

    /// Returns true if `prefix` is this path or one of its ancestors.
    pub fn has_prefix(&self, prefix: &ScenePath) -> bool {
        if prefix.is_root() || self == prefix {
            return true;
        }
        self.0.starts_with(&prefix.0)
            && self.0.as_bytes().get(prefix.0.len()) == Some(&(SEPARATOR as u8))
    }

    /// Iterates over the path segments, root first. The root has none.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|s| !s.is_empty())
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ScenePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ScenePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ScenePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
