// ABOUTME: DNS-compatible release name validation.
// ABOUTME: Release names double as the package tool's release identifier.

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// The package tool stores release metadata in labels, which caps names at 53 chars.
pub const MAX_RELEASE_NAME_LEN: usize = 53;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReleaseNameError {
    #[error("release name cannot be empty")]
    Empty,

    #[error("release name exceeds maximum length of {MAX_RELEASE_NAME_LEN} characters")]
    TooLong,

    #[error("release name must start with a lowercase letter or digit")]
    BadStart,

    #[error("release name must end with a lowercase letter or digit")]
    BadEnd,

    #[error("release name must be lowercase")]
    NotLowercase,

    #[error("invalid character in release name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReleaseName(String);

impl ReleaseName {
    pub fn new(value: &str) -> Result<Self, ReleaseNameError> {
        if value.is_empty() {
            return Err(ReleaseNameError::Empty);
        }

        if value.len() > MAX_RELEASE_NAME_LEN {
            return Err(ReleaseNameError::TooLong);
        }

        for c in value.chars() {
            if c.is_ascii_uppercase() {
                return Err(ReleaseNameError::NotLowercase);
            }
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' && c != '.' {
                return Err(ReleaseNameError::InvalidChar(c));
            }
        }

        if value.starts_with(['-', '.']) {
            return Err(ReleaseNameError::BadStart);
        }

        if value.ends_with(['-', '.']) {
            return Err(ReleaseNameError::BadEnd);
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReleaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ReleaseName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ReleaseName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ReleaseName::new(&s).map_err(serde::de::Error::custom)
    }
}
