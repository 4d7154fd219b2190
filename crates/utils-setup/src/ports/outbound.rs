//! Outbound Ports (Driven Ports)
//!
//! Collaborators the phases delegate to. The message bus port lives in
//! `shared-bus` and the configuration store in `shared-conf`.

use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::Path;

use async_trait::async_trait;

use crate::domain::{PackageKind, PackageRequirement};
use crate::error::{ServiceError, ValidationError};

/// An external command: program plus arguments, never a shell string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &Path {
        Path::new(&self.program)
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub return_code: i32,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.return_code == 0
    }
}

/// Runs external commands to completion.
///
/// `Err` means the command could not be started; a command that ran and
/// failed is reported through `ProcessOutput::return_code`.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// With `realtime_output`, lines are forwarded to the log as they arrive
    /// and still captured in the result.
    async fn run(&self, command: &CommandSpec, realtime_output: bool) -> io::Result<ProcessOutput>;
}

/// Checks that packages are installed at the required versions.
#[async_trait]
pub trait PackageValidator: Send + Sync {
    async fn validate(
        &self,
        kind: PackageKind,
        packages: &[PackageRequirement],
    ) -> Result<(), ValidationError>;
}

/// Controls OS-level services.
#[async_trait]
pub trait ServiceController: Send + Sync {
    async fn restart(&self, service: &str) -> Result<(), ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display() {
        let cmd = CommandSpec::new("/opt/cortx/utils/bin/run_test")
            .args(["-c", "json:///etc/cortx/cluster.conf"])
            .arg("-t")
            .arg("/opt/plans/sanity.pln");
        assert_eq!(
            cmd.to_string(),
            "/opt/cortx/utils/bin/run_test -c json:///etc/cortx/cluster.conf -t /opt/plans/sanity.pln"
        );
        assert_eq!(cmd.get_args().len(), 4);
        assert_eq!(cmd.program(), Path::new("/opt/cortx/utils/bin/run_test"));
    }

    #[test]
    fn test_output_success() {
        assert!(ProcessOutput::default().success());
        let failed = ProcessOutput {
            return_code: 1,
            ..ProcessOutput::default()
        };
        assert!(!failed.success());
    }
}
