//! Package validation through the system package managers.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{PackageKind, PackageRequirement};
use crate::error::ValidationError;
use crate::ports::outbound::{CommandSpec, PackageValidator, ProcessRunner};

/// One entry of `pip3 list --format=json`.
#[derive(Debug, Clone, Deserialize)]
pub struct PipPackage {
    pub name: String,
    pub version: String,
}

/// Validates pip packages via `pip3 list` and rpm packages via `rpm -q`.
pub struct SystemPackageValidator {
    runner: Arc<dyn ProcessRunner>,
    pip: PathBuf,
    rpm: PathBuf,
}

impl SystemPackageValidator {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            pip: PathBuf::from("pip3"),
            rpm: PathBuf::from("rpm"),
        }
    }

    async fn installed_pip_packages(&self) -> Result<Vec<PipPackage>, ValidationError> {
        let command = CommandSpec::new(&self.pip).args(["list", "--format=json"]);
        let failed = |detail: String| ValidationError::Package {
            kind: PackageKind::PipPackages,
            detail,
        };
        let output = self
            .runner
            .run(&command, false)
            .await
            .map_err(|e| failed(format!("{} could not be run: {}", command, e)))?;
        if !output.success() {
            return Err(failed(format!(
                "{} exited with {}: {}",
                command,
                output.return_code,
                output.stderr.trim()
            )));
        }
        serde_json::from_str(&output.stdout)
            .map_err(|e| failed(format!("unreadable output of {}: {}", command, e)))
    }

    async fn check_rpm(&self, requirement: &PackageRequirement) -> Result<Option<String>, ValidationError> {
        let command = CommandSpec::new(&self.rpm).arg("-q").arg(&requirement.name);
        let output = self.runner.run(&command, false).await.map_err(|e| {
            ValidationError::Package {
                kind: PackageKind::RpmPackages,
                detail: format!("{} could not be run: {}", command, e),
            }
        })?;
        if !output.success() {
            return Ok(Some(format!("{} is not installed", requirement)));
        }
        let installed = output.stdout.trim();
        Ok(match &requirement.version {
            Some(version) if !installed.starts_with(&format!("{}-{}", requirement.name, version)) => {
                Some(format!("{} required, found {}", requirement, installed))
            }
            _ => None,
        })
    }
}

/// Pip treats `-`, `_` and `.` as equivalent and ignores case.
fn normalize(name: &str) -> String {
    name.to_ascii_lowercase().replace(['_', '.'], "-")
}

/// Requirements not met by `installed`, one message per offender.
pub fn pip_offenders(installed: &[PipPackage], requirements: &[PackageRequirement]) -> Vec<String> {
    let by_name: HashMap<String, &str> = installed
        .iter()
        .map(|p| (normalize(&p.name), p.version.as_str()))
        .collect();
    requirements
        .iter()
        .filter_map(|req| match (by_name.get(&normalize(&req.name)), &req.version) {
            (None, _) => Some(format!("{} is not installed", req)),
            (Some(found), Some(wanted)) if found != wanted => {
                Some(format!("{} required, found {}", req, found))
            }
            _ => None,
        })
        .collect()
}

#[async_trait]
impl PackageValidator for SystemPackageValidator {
    async fn validate(
        &self,
        kind: PackageKind,
        packages: &[PackageRequirement],
    ) -> Result<(), ValidationError> {
        let offenders = match kind {
            PackageKind::PipPackages => {
                let installed = self.installed_pip_packages().await?;
                pip_offenders(&installed, packages)
            }
            PackageKind::RpmPackages => {
                let mut offenders = Vec::new();
                for requirement in packages {
                    offenders.extend(self.check_rpm(requirement).await?);
                }
                offenders
            }
        };
        debug!(%kind, checked = packages.len(), failed = offenders.len(), "Packages checked");
        if offenders.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Package {
                kind,
                detail: offenders.join("; "),
            })
        }
    }
}
