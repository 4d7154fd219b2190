//! Inbound Ports (Driving Ports)
//!
//! The phase API invoked by the CLI or an install orchestrator.

use async_trait::async_trait;
use shared_conf::ConfUrl;

use crate::context::ConfigContext;
use crate::domain::{Phase, PhaseRequest, UpgradeLevel};
use crate::error::SetupError;

/// One operation per lifecycle phase.
///
/// Every phase is idempotent and either completes or returns an error; side
/// effects done before a failure are not rolled back.
#[async_trait]
pub trait SetupApi: Send + Sync {
    /// Placeholder for prerequisite checks of `phase`.
    async fn validate(&self, ctx: &mut ConfigContext, phase: Option<Phase>) -> Result<(), SetupError>;

    /// Validate packages, set the support bundle path, check this node's
    /// keys and copy the cluster node map.
    async fn post_install(&self, ctx: &mut ConfigContext, config: &ConfUrl) -> Result<(), SetupError>;

    /// Propagate storage paths, copy the node map, restart the log daemon
    /// and prepare log directories.
    async fn config(&self, ctx: &mut ConfigContext, config: &ConfUrl) -> Result<(), SetupError>;

    /// Register the fixed message types.
    async fn init(&self, ctx: &mut ConfigContext, config: &ConfUrl) -> Result<(), SetupError>;

    /// Run the external test runner with the named plan.
    async fn test(&self, ctx: &mut ConfigContext, config: &ConfUrl, plan: &str) -> Result<(), SetupError>;

    /// Purge every message type and truncate log files.
    async fn reset(&self, ctx: &mut ConfigContext, config: &ConfUrl) -> Result<(), SetupError>;

    /// Deregister every message type; with `pre_factory`, delete log files.
    async fn cleanup(
        &self,
        ctx: &mut ConfigContext,
        config: &ConfUrl,
        pre_factory: bool,
    ) -> Result<(), SetupError>;

    async fn upgrade(&self, ctx: &mut ConfigContext, config: &ConfUrl) -> Result<(), SetupError>;

    async fn pre_upgrade(&self, ctx: &mut ConfigContext, level: UpgradeLevel) -> Result<(), SetupError>;

    async fn post_upgrade(&self, ctx: &mut ConfigContext, level: UpgradeLevel) -> Result<(), SetupError>;

    /// Dispatch a request to its phase.
    async fn run(&self, ctx: &mut ConfigContext, request: &PhaseRequest) -> Result<(), SetupError> {
        match request {
            PhaseRequest::Validate { phase } => self.validate(ctx, *phase).await,
            PhaseRequest::PostInstall { config } => self.post_install(ctx, config).await,
            PhaseRequest::Config { config } => self.config(ctx, config).await,
            PhaseRequest::Init { config } => self.init(ctx, config).await,
            PhaseRequest::Test { config, plan } => self.test(ctx, config, plan).await,
            PhaseRequest::Reset { config } => self.reset(ctx, config).await,
            PhaseRequest::Cleanup { config, pre_factory } => {
                self.cleanup(ctx, config, *pre_factory).await
            }
            PhaseRequest::Upgrade { config } => self.upgrade(ctx, config).await,
            PhaseRequest::PreUpgrade { level } => self.pre_upgrade(ctx, *level).await,
            PhaseRequest::PostUpgrade { level } => self.post_upgrade(ctx, *level).await,
        }
    }
}
