// Copyright 2025, Allo Protocol contributors.
// Licensed under MIT or Apache-2.0, at your option.

//! Deployment version tags.
//!
//! Versions look like `v<major>.<minor>` with an optional trailing letter. The letter marks a
//! redeployment of the same numeric version after a failed attempt, e.g. `v2.1` then `v2.1a`.

use std::{fmt, str::FromStr, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^v(\d+)\.(\d+)([a-z])?$").expect("version pattern is valid")
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeploymentVersion {
    pub major: u32,
    pub minor: u32,
    pub redeploy: Option<char>,
}

impl DeploymentVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            redeploy: None,
        }
    }
}

impl fmt::Display for DeploymentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)?;
        if let Some(c) = self.redeploy {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid deployment version {0:?}, expected v<major>.<minor>[letter]")]
pub struct VersionError(pub String);

impl FromStr for DeploymentVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = pattern()
            .captures(s.trim())
            .ok_or_else(|| VersionError(s.to_string()))?;
        let number = |i: usize| {
            caps[i]
                .parse::<u32>()
                .map_err(|_| VersionError(s.to_string()))
        };
        Ok(Self {
            major: number(1)?,
            minor: number(2)?,
            redeploy: caps.get(3).and_then(|m| m.as_str().chars().next()),
        })
    }
}

impl Serialize for DeploymentVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DeploymentVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_versions() {
        let test_cases = vec![
            ("v1.0", Some(DeploymentVersion::new(1, 0))),
            (
                "v2.1b",
                Some(DeploymentVersion {
                    major: 2,
                    minor: 1,
                    redeploy: Some('b'),
                }),
            ),
            ("v10.12", Some(DeploymentVersion::new(10, 12))),
            ("1.0", None),
            ("v1", None),
            ("v1.0ab", None),
            ("v1.0B", None),
        ];
        for (input, expected) in test_cases {
            assert_eq!(input.parse::<DeploymentVersion>().ok(), expected, "{input}");
        }
    }

    #[test]
    fn display_matches_input() {
        for input in ["v1.0", "v2.1a", "v0.3z"] {
            let version: DeploymentVersion = input.parse().unwrap();
            assert_eq!(version.to_string(), input);
        }
    }
}
