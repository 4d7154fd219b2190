//! Config source URLs of the form `<scheme>://<path>`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfError;

/// Storage backends a config URL can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfScheme {
    /// A JSON document on the local filesystem.
    Json,
}

impl ConfScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
        }
    }
}

/// Location of a configuration source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfUrl {
    scheme: ConfScheme,
    path: PathBuf,
}

impl ConfUrl {
    /// URL for a JSON file.
    pub fn json(path: impl AsRef<Path>) -> Self {
        Self {
            scheme: ConfScheme::Json,
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ConfError> {
        let Some((scheme, path)) = raw.split_once("://") else {
            return Err(ConfError::InvalidUrl {
                url: raw.to_string(),
                reason: "expected <scheme>://<path>".to_string(),
            });
        };
        if path.is_empty() {
            return Err(ConfError::InvalidUrl {
                url: raw.to_string(),
                reason: "empty path".to_string(),
            });
        }
        let scheme = match scheme {
            "json" => ConfScheme::Json,
            other => {
                return Err(ConfError::UnsupportedScheme {
                    scheme: other.to_string(),
                })
            }
        };
        Ok(Self {
            scheme,
            path: PathBuf::from(path),
        })
    }

    pub fn scheme(&self) -> ConfScheme {
        self.scheme
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FromStr for ConfUrl {
    type Err = ConfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConfUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme.as_str(), self.path.display())
    }
}
