use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A build-tool version such as `8.5`, `4.10.3` or `7.0-rc-1`.
///
/// Versions order numerically; a pre-release suffix sorts before the plain release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GradleVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid Gradle version `{0}`")]
pub struct GradleVersionError(pub String);

impl GradleVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            patch: 0,
            suffix: None,
        }
    }

    pub fn parse(text: &str) -> Result<Self, GradleVersionError> {
        let trimmed = text.trim();
        let (numbers, suffix) = match trimmed.split_once('-') {
            Some((numbers, suffix)) => (numbers, Some(suffix.to_string())),
            None => (trimmed, None),
        };

        let mut parts = [0u32; 3];
        let mut count = 0;
        for segment in numbers.split('.') {
            if count == parts.len() {
                return Err(GradleVersionError(text.to_string()));
            }
            parts[count] = segment
                .parse()
                .map_err(|_| GradleVersionError(text.to_string()))?;
            count += 1;
        }

        Ok(Self {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
            suffix: suffix.filter(|s| !s.is_empty()),
        })
    }
}

impl Ord for GradleVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.suffix, &other.suffix) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for GradleVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for GradleVersion {
    type Err = GradleVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for GradleVersion {
    type Error = GradleVersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<GradleVersion> for String {
    fn from(value: GradleVersion) -> Self {
        value.to_string()
    }
}

impl fmt::Display for GradleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if self.patch != 0 {
            write!(f, ".{}", self.patch)?;
        }
        if let Some(suffix) = &self.suffix {
            write!(f, "-{suffix}")?;
        }
        Ok(())
    }
}
