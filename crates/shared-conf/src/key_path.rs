//! Key paths
//!
//! A key path is a non-empty list of segments joined by `>`. A segment may
//! address a list element with an index suffix, e.g. `endpoints[1]`.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfError;

/// Separator between key path segments.
pub const KEY_DELIMITER: char = '>';

/// One step of a key path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    name: String,
    index: Option<usize>,
}

impl Segment {
    /// Map key of this segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// List index, if the segment addresses a list element.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    fn parse(raw: &str, full_key: &str) -> Result<Self, ConfError> {
        let invalid = |reason: &str| ConfError::InvalidKey {
            key: full_key.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("empty segment"));
        }

        let Some(open) = raw.find('[') else {
            if raw.contains(']') {
                return Err(invalid("unbalanced ']'"));
            }
            return Ok(Self {
                name: raw.to_string(),
                index: None,
            });
        };

        let name = &raw[..open];
        let rest = &raw[open + 1..];
        let Some(digits) = rest.strip_suffix(']') else {
            return Err(invalid("index suffix must end with ']'"));
        };
        if name.is_empty() {
            return Err(invalid("index without a key name"));
        }
        let index = digits
            .parse::<usize>()
            .map_err(|_| invalid("index must be a non-negative integer"))?;

        Ok(Self {
            name: name.to_string(),
            index: Some(index),
        })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{}]", self.name, i),
            None => f.write_str(&self.name),
        }
    }
}

/// A parsed `>`-delimited configuration key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    /// Parse a key such as `node>srvnode-1>hostname`.
    pub fn parse(key: &str) -> Result<Self, ConfError> {
        if key.trim().is_empty() {
            return Err(ConfError::InvalidKey {
                key: key.to_string(),
                reason: "empty key".to_string(),
            });
        }
        let segments = key
            .split(KEY_DELIMITER)
            .map(|raw| Segment::parse(raw, key))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    /// Build a key from plain segment names, joining them with `>`.
    pub fn from_parts<I, S>(parts: I) -> Result<Self, ConfError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = parts
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(&KEY_DELIMITER.to_string());
        Self::parse(&joined)
    }

    /// Append a segment, returning a new key.
    pub fn child(&self, segment: &str) -> Result<Self, ConfError> {
        Self::parse(&format!("{}{}{}", self, KEY_DELIMITER, segment))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Split into the parent segments and the final segment.
    pub(crate) fn split_last(&self) -> (&[Segment], &Segment) {
        // Parsing guarantees at least one segment.
        let (last, parents) = self
            .segments
            .split_last()
            .unwrap_or_else(|| unreachable!("key path without segments"));
        (parents, last)
    }
}

impl FromStr for KeyPath {
    type Err = ConfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", KEY_DELIMITER)?;
            }
            write!(f, "{}", seg)?;
        }
        Ok(())
    }
}
