//! Setup phases and their parameters.

use std::fmt;
use std::str::FromStr;

use shared_conf::ConfUrl;
use thiserror::Error;

/// A lifecycle phase. Phases are not persisted; the caller invokes them in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Validate,
    PostInstall,
    Config,
    Init,
    Test,
    Reset,
    Cleanup,
    Upgrade,
    PreUpgrade,
    PostUpgrade,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::PostInstall => "post_install",
            Self::Config => "config",
            Self::Init => "init",
            Self::Test => "test",
            Self::Reset => "reset",
            Self::Cleanup => "cleanup",
            Self::Upgrade => "upgrade",
            Self::PreUpgrade => "pre_upgrade",
            Self::PostUpgrade => "post_upgrade",
        }
    }

    #[must_use]
    pub fn all() -> [Phase; 10] {
        [
            Self::Validate,
            Self::PostInstall,
            Self::Config,
            Self::Init,
            Self::Test,
            Self::Reset,
            Self::Cleanup,
            Self::Upgrade,
            Self::PreUpgrade,
            Self::PostUpgrade,
        ]
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized phase or level name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {what} '{value}'")]
pub struct ParseNameError {
    what: &'static str,
    value: String,
}

impl FromStr for Phase {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParseNameError {
                what: "phase",
                value: s.to_string(),
            })
    }
}

/// Scope of an upgrade hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpgradeLevel {
    Node,
    Cluster,
}

impl UpgradeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Cluster => "cluster",
        }
    }
}

impl fmt::Display for UpgradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpgradeLevel {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" => Ok(Self::Node),
            "cluster" => Ok(Self::Cluster),
            other => Err(ParseNameError {
                what: "upgrade level",
                value: other.to_string(),
            }),
        }
    }
}

/// A phase invocation with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseRequest {
    Validate { phase: Option<Phase> },
    PostInstall { config: ConfUrl },
    Config { config: ConfUrl },
    Init { config: ConfUrl },
    Test { config: ConfUrl, plan: String },
    Reset { config: ConfUrl },
    Cleanup { config: ConfUrl, pre_factory: bool },
    Upgrade { config: ConfUrl },
    PreUpgrade { level: UpgradeLevel },
    PostUpgrade { level: UpgradeLevel },
}

impl PhaseRequest {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Validate { .. } => Phase::Validate,
            Self::PostInstall { .. } => Phase::PostInstall,
            Self::Config { .. } => Phase::Config,
            Self::Init { .. } => Phase::Init,
            Self::Test { .. } => Phase::Test,
            Self::Reset { .. } => Phase::Reset,
            Self::Cleanup { .. } => Phase::Cleanup,
            Self::Upgrade { .. } => Phase::Upgrade,
            Self::PreUpgrade { .. } => Phase::PreUpgrade,
            Self::PostUpgrade { .. } => Phase::PostUpgrade,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names_round_trip() {
        for phase in Phase::all() {
            assert_eq!(phase.as_str().parse::<Phase>().unwrap(), phase);
        }
        assert!("prepare".parse::<Phase>().is_err());
    }

    #[test]
    fn test_upgrade_level() {
        assert_eq!("node".parse::<UpgradeLevel>().unwrap(), UpgradeLevel::Node);
        assert_eq!("cluster".parse::<UpgradeLevel>().unwrap(), UpgradeLevel::Cluster);
        let err = "rack".parse::<UpgradeLevel>().unwrap_err();
        assert_eq!(err.to_string(), "unknown upgrade level 'rack'");
    }

    #[test]
    fn test_request_phase() {
        let req = PhaseRequest::Cleanup {
            config: ConfUrl::json("/etc/cortx/cluster.conf"),
            pre_factory: true,
        };
        assert_eq!(req.phase(), Phase::Cleanup);
        assert_eq!(
            PhaseRequest::PreUpgrade { level: UpgradeLevel::Node }.phase(),
            Phase::PreUpgrade
        );
    }
}
