//! Release version identifiers.
//!
//! A [`Version`] is the four-part `major.minor.patch.build` number stamped on
//! every published build. A [`BaseVersion`] is the `major.minor.patch` prefix
//! shared by all builds of one release line; it names the version family
//! that partitions the availability cache.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ProbeError, Result};

// Leading zeros are rejected so that parsing and display round-trip exactly.
static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)$").unwrap()
});

static BASE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)$").unwrap()
});

const VERSION_SHAPE: &str = "major.minor.patch.build";
const BASE_SHAPE: &str = "major.minor.patch";

/// A fully qualified build version.
///
/// Ordering is component-wise, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub build: u32,
}

/// The build-less prefix of a version; one cache table per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BaseVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Create a version from its components.
    pub fn new(major: u32, minor: u32, patch: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }

    /// Parse a strict `major.minor.patch.build` string.
    pub fn parse(input: &str) -> Result<Self> {
        let caps = VERSION_REGEX
            .captures(input)
            .ok_or_else(|| invalid(input, VERSION_SHAPE))?;
        let part = |i: usize| -> Result<u32> {
            caps[i].parse().map_err(|_| invalid(input, VERSION_SHAPE))
        };
        Ok(Self::new(part(1)?, part(2)?, part(3)?, part(4)?))
    }

    /// The family this build belongs to.
    pub fn base(&self) -> BaseVersion {
        BaseVersion::new(self.major, self.minor, self.patch)
    }

    pub fn build(&self) -> u32 {
        self.build
    }

    /// `major.minor.patch`, as substituted for `{version}` in URL templates.
    pub fn without_build(&self) -> String {
        self.base().to_string()
    }

    /// Release branch the build was cut from.
    ///
    /// `.0` patch releases come from `release`, the `99.99.99` line is the
    /// nightly `develop` stream, and everything else is a `hotfix`.
    pub fn branch(&self) -> &'static str {
        if self.base() == BaseVersion::new(99, 99, 99) {
            "develop"
        } else if self.patch == 0 {
            "release"
        } else {
            "hotfix"
        }
    }
}

impl BaseVersion {
    /// Create a base version from its components.
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a strict `major.minor.patch` string.
    pub fn parse(input: &str) -> Result<Self> {
        let caps = BASE_REGEX
            .captures(input)
            .ok_or_else(|| invalid(input, BASE_SHAPE))?;
        let part =
            |i: usize| -> Result<u32> { caps[i].parse().map_err(|_| invalid(input, BASE_SHAPE)) };
        Ok(Self::new(part(1)?, part(2)?, part(3)?))
    }

    /// The full version for a given build of this family.
    pub fn with_build(&self, build: u32) -> Version {
        Version::new(self.major, self.minor, self.patch, build)
    }
}

fn invalid(input: &str, expected: &'static str) -> ProbeError {
    ProbeError::InvalidVersion {
        input: input.to_string(),
        expected,
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.patch, self.build
        )
    }
}

impl fmt::Display for BaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl FromStr for BaseVersion {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Version::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for BaseVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BaseVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        BaseVersion::parse(&raw).map_err(serde::de::Error::custom)
    }
}
