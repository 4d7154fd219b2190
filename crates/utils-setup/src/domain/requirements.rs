//! Package requirements and manifest parsing.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{SetupError, ValidationError};

/// Which package manager a requirement is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageKind {
    PipPackages,
    RpmPackages,
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PipPackages => "pip-packages",
            Self::RpmPackages => "rpm-packages",
        })
    }
}

/// A package that must be installed, optionally at an exact version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageRequirement {
    pub name: String,
    pub version: Option<String>,
}

impl PackageRequirement {
    /// Any installed version satisfies the requirement.
    pub fn any(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    pub fn pinned(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }
}

/// Renders as `name (version)` or bare `name`.
impl fmt::Display for PackageRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{} ({})", self.name, v),
            None => f.write_str(&self.name),
        }
    }
}

/// Parse `name==version` lines. Blank lines and `#` comments are skipped.
pub fn parse_manifest(path: &Path, contents: &str) -> Result<Vec<PackageRequirement>, ValidationError> {
    let mut requirements = Vec::new();
    for (idx, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let malformed = |reason: &str| ValidationError::Manifest {
            path: path.to_path_buf(),
            line: idx + 1,
            reason: reason.to_string(),
        };
        let (name, version) = line
            .split_once("==")
            .ok_or_else(|| malformed("expected <name>==<version>"))?;
        let (name, version) = (name.trim(), version.trim());
        if name.is_empty() || version.is_empty() {
            return Err(malformed("empty package name or version"));
        }
        requirements.push(PackageRequirement::pinned(name, version));
    }
    Ok(requirements)
}

/// Read and merge manifests in order. Missing files are skipped.
pub fn read_manifests(paths: &[PathBuf]) -> Result<Vec<PackageRequirement>, SetupError> {
    let mut merged = Vec::new();
    for path in paths {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(manifest = %path.display(), "Requirements manifest not found, skipping");
                continue;
            }
            Err(e) => {
                return Err(SetupError::io(
                    format!("Failed to read requirements manifest {}", path.display()),
                    e,
                ))
            }
        };
        merged.extend(parse_manifest(path, &contents)?);
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let reqs = parse_manifest(
            Path::new("python_requirements.txt"),
            "# core\nconfluent-kafka==1.5.0\n\n  PyYAML == 5.4.1 \n",
        )
        .unwrap();
        assert_eq!(
            reqs,
            vec![
                PackageRequirement::pinned("confluent-kafka", "1.5.0"),
                PackageRequirement::pinned("PyYAML", "5.4.1"),
            ]
        );
        assert_eq!(reqs[0].to_string(), "confluent-kafka (1.5.0)");
    }

    #[test]
    fn test_malformed_line_reports_position() {
        let err = parse_manifest(Path::new("req.txt"), "a==1\nrequests>=2.0\n").unwrap_err();
        match err {
            ValidationError::Manifest { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse_manifest(Path::new("req.txt"), "==1.0").is_err());
    }

    #[test]
    fn test_read_manifests_merges_and_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("python_requirements.txt");
        let ext = dir.path().join("python_requirements.ext.txt");
        fs::write(&base, "a==1\n").unwrap();

        let reqs = read_manifests(&[base.clone(), ext.clone()]).unwrap();
        assert_eq!(reqs, vec![PackageRequirement::pinned("a", "1")]);

        fs::write(&ext, "b==2\n").unwrap();
        let reqs = read_manifests(&[base, ext]).unwrap();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[1].name, "b");
    }

    #[test]
    fn test_display_unpinned() {
        assert_eq!(PackageRequirement::any("cortx-py-utils-test").to_string(), "cortx-py-utils-test");
        assert_eq!(PackageKind::RpmPackages.to_string(), "rpm-packages");
    }
}
