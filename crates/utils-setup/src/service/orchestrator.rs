//! # Setup Orchestrator
//!
//! Implements `SetupApi` by sequencing calls to the injected collaborators.
//!
//! ## Namespaces
//!
//! | Phase | Template namespace | Reload |
//! |---|---|---|
//! | post_install | `post_install_index` | always |
//! | config | `config` | always |
//! | init / reset / cleanup | `config` | skipped when loaded |
//!
//! The node map of the template is copied into the `cluster` namespace,
//! which is bound to the template file itself.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use shared_bus::MessageBusAdmin;
use shared_conf::ConfUrl;
use tracing::{info, warn};

use super::helpers::{bus_endpoints, connect_message_bus, copy_cluster_map, validate_node_keys};
use crate::context::{ConfigContext, StorageKind};
use crate::domain::log_files::{find_log_files, prepare_log_subdir, remove_file, truncate_file};
use crate::domain::{
    keys, read_manifests, PackageKind, PackageRequirement, Phase, SetupConfig, UpgradeLevel,
};
use crate::error::{codes, SetupError, ValidationError};
use crate::ports::inbound::SetupApi;
use crate::ports::outbound::{CommandSpec, PackageValidator, ProcessRunner, ServiceController};

/// Template namespace of the post_install phase.
pub const POST_INSTALL_INDEX: &str = "post_install_index";
/// Template namespace of the config, init, reset and cleanup phases.
pub const CONFIG_INDEX: &str = "config";

const CREATE_MESSAGE_TYPE_FAILED: &str = "Unable to create message_type";
const RESET_BUS_FAILED: &str = "Can not reset Message Bus";
const CLEANUP_BUS_FAILED: &str = "Can not cleanup Message Bus";

/// The utils setup service.
///
/// Stateless between calls: everything a phase reads or writes goes through
/// the `ConfigContext` or a collaborator.
pub struct SetupOrchestrator {
    config: SetupConfig,
    validator: Arc<dyn PackageValidator>,
    runner: Arc<dyn ProcessRunner>,
    message_bus: Arc<dyn MessageBusAdmin>,
    services: Arc<dyn ServiceController>,
}

impl SetupOrchestrator {
    pub fn new(
        config: SetupConfig,
        validator: Arc<dyn PackageValidator>,
        runner: Arc<dyn ProcessRunner>,
        message_bus: Arc<dyn MessageBusAdmin>,
        services: Arc<dyn ServiceController>,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        Ok(Self {
            config,
            validator,
            runner,
            message_bus,
            services,
        })
    }

    fn utils_dir(install_path: &str) -> PathBuf {
        Path::new(install_path).join("cortx/utils")
    }

    async fn validate_pip_requirements(&self, install_path: &str) -> Result<(), SetupError> {
        let conf_dir = Self::utils_dir(install_path).join("conf");
        let manifests: Vec<PathBuf> = self
            .config
            .requirement_manifests
            .iter()
            .map(|name| conf_dir.join(name))
            .collect();
        let requirements = read_manifests(&manifests)?;
        if requirements.is_empty() {
            info!("No python requirements to validate");
            return Ok(());
        }
        self.validator
            .validate(PackageKind::PipPackages, &requirements)
            .await?;
        info!(packages = requirements.len(), "Python requirements validated");
        Ok(())
    }

    async fn register_message_types(&self) -> Result<(), SetupError> {
        match self
            .message_bus
            .register_message_types(&self.config.message_types, self.config.partitions)
            .await
        {
            Ok(()) => {
                info!(message_types = ?self.config.message_types, "Message types registered");
                Ok(())
            }
            Err(e) if e.is_already_exists() => {
                info!(message_types = ?self.config.message_types, "Message types already registered");
                Ok(())
            }
            Err(e) => Err(SetupError::message_bus(CREATE_MESSAGE_TYPE_FAILED, e)),
        }
    }
}

#[async_trait]
impl SetupApi for SetupOrchestrator {
    async fn validate(&self, _ctx: &mut ConfigContext, phase: Option<Phase>) -> Result<(), SetupError> {
        match phase {
            Some(phase) => info!(%phase, "Validating prerequisites"),
            None => info!("Validating prerequisites"),
        }
        Ok(())
    }

    async fn post_install(&self, ctx: &mut ConfigContext, config: &ConfUrl) -> Result<(), SetupError> {
        let install_path = ctx.require_str(keys::INSTALL_PATH)?;
        self.validate_pip_requirements(&install_path).await?;

        let bundle_dir = &self.config.support_bundle_dir;
        ctx.set_and_save(keys::SUPPORT_LOCAL_PATH, bundle_dir.to_string_lossy().into_owned())?;
        fs::create_dir_all(bundle_dir).map_err(|e| {
            SetupError::io(
                format!("Failed to create support bundle directory {}", bundle_dir.display()),
                e,
            )
        })?;

        ctx.store_mut().load(POST_INSTALL_INDEX, config, false)?;
        validate_node_keys(ctx, POST_INSTALL_INDEX, config)?;
        copy_cluster_map(ctx, POST_INSTALL_INDEX, config)?;
        Ok(())
    }

    async fn config(&self, ctx: &mut ConfigContext, config: &ConfUrl) -> Result<(), SetupError> {
        ctx.store_mut().load(CONFIG_INDEX, config, false)?;

        match ctx.storage_path(StorageKind::Log)? {
            Some(log_root) => {
                ctx.set_and_save(keys::LOG_DIR, log_root.to_string_lossy().into_owned())?;
                info!(log_dir = %log_root.display(), "Log directory set");
            }
            None => info!("No log storage configured, log_dir left unchanged"),
        }

        copy_cluster_map(ctx, CONFIG_INDEX, config)?;

        let rsyslog = &self.config.rsyslog_service;
        match self.services.restart(rsyslog).await {
            Ok(()) => info!(service = %rsyslog, "Service restarted"),
            Err(e) => warn!(service = %rsyslog, error = %e, "Service restart failed, continuing"),
        }

        if let Some(shared) = ctx.storage_path(StorageKind::Shared)? {
            ctx.set_and_save(keys::SUPPORT_SHARED_PATH, shared.to_string_lossy().into_owned())?;
        }

        let log_path = ctx.log_path(None)?;
        for subdir in &self.config.log_subdirs {
            let file = prepare_log_subdir(&log_path, subdir).map_err(|e| {
                SetupError::io(
                    format!("Failed to prepare log directory {}", log_path.join(subdir).display()),
                    e,
                )
            })?;
            info!(file = %file.display(), "Log file ready");
        }
        Ok(())
    }

    async fn init(&self, ctx: &mut ConfigContext, config: &ConfUrl) -> Result<(), SetupError> {
        ctx.store_mut().load(CONFIG_INDEX, config, true)?;
        let endpoints = bus_endpoints(ctx, CONFIG_INDEX, config)?;
        connect_message_bus(self.message_bus.as_ref(), &endpoints, CREATE_MESSAGE_TYPE_FAILED)
            .await?;
        self.register_message_types().await
    }

    async fn test(&self, ctx: &mut ConfigContext, config: &ConfUrl, plan: &str) -> Result<(), SetupError> {
        let package = PackageRequirement::any(&self.config.test_package);
        self.validator
            .validate(PackageKind::RpmPackages, std::slice::from_ref(&package))
            .await
            .map_err(|e| {
                SetupError::operation(codes::EINVAL, format!("Failed at package Validation: {}", e))
            })?;

        let install_path = ctx.require_str(keys::INSTALL_PATH)?;
        let utils_dir = Self::utils_dir(&install_path);
        let plan_dir = ctx
            .get_str(keys::TEST_PLAN_DIR)?
            .map(PathBuf::from)
            .unwrap_or_else(|| utils_dir.join("test/plans"));
        let plan_path = plan_dir.join(format!("{}.pln", plan));
        if !plan_path.is_file() {
            return Err(ValidationError::PlanNotFound { path: plan_path }.into());
        }

        let command = CommandSpec::new(utils_dir.join("bin/run_test"))
            .arg("-c")
            .arg(config.to_string())
            .arg("-t")
            .arg(&plan_path);
        info!(%command, "Running utils tests");
        let output = self
            .runner
            .run(&command, true)
            .await
            .map_err(|e| SetupError::io(format!("Failed to run {}", command.program().display()), e))?;

        if !output.success() {
            return Err(SetupError::TestFailed {
                output: output.stdout,
                error: output.stderr,
                return_code: output.return_code,
            });
        }
        info!(plan, "Utils tests passed");
        Ok(())
    }

    async fn reset(&self, ctx: &mut ConfigContext, config: &ConfUrl) -> Result<(), SetupError> {
        ctx.store_mut().load(CONFIG_INDEX, config, true)?;
        let endpoints = bus_endpoints(ctx, CONFIG_INDEX, config)?;
        connect_message_bus(self.message_bus.as_ref(), &endpoints, RESET_BUS_FAILED).await?;

        let message_types = self
            .message_bus
            .list_message_types()
            .await
            .map_err(|e| SetupError::message_bus(RESET_BUS_FAILED, e))?;
        for message_type in &message_types {
            self.message_bus
                .purge_message_type(message_type)
                .await
                .map_err(|e| SetupError::message_bus(RESET_BUS_FAILED, e))?;
            info!(%message_type, "Message type purged");
        }

        let log_path = ctx.log_path(None)?;
        let reset_failed = |e: std::io::Error| {
            SetupError::operation(codes::ERR_OP_FAILED, format!("Can not reset log files. {}", e))
        };
        let files = find_log_files(&log_path).map_err(reset_failed)?;
        for file in &files {
            truncate_file(file).map_err(reset_failed)?;
        }
        info!(log_path = %log_path.display(), files = files.len(), "Log files truncated");
        Ok(())
    }

    async fn cleanup(
        &self,
        ctx: &mut ConfigContext,
        config: &ConfUrl,
        pre_factory: bool,
    ) -> Result<(), SetupError> {
        ctx.store_mut().load(CONFIG_INDEX, config, true)?;
        let endpoints = bus_endpoints(ctx, CONFIG_INDEX, config)?;
        connect_message_bus(self.message_bus.as_ref(), &endpoints, CLEANUP_BUS_FAILED).await?;

        let message_types = self
            .message_bus
            .list_message_types()
            .await
            .map_err(|e| SetupError::message_bus(CLEANUP_BUS_FAILED, e))?;
        if message_types.is_empty() {
            info!("No message types registered");
        } else {
            self.message_bus
                .deregister_message_types(&message_types)
                .await
                .map_err(|e| SetupError::message_bus(CLEANUP_BUS_FAILED, e))?;
            info!(?message_types, "Message types deregistered");
        }

        if pre_factory {
            let log_path = ctx.log_path(None)?;
            let files = find_log_files(&log_path).map_err(|e| {
                SetupError::io(format!("Error listing log files under {}", log_path.display()), e)
            })?;
            for file in &files {
                remove_file(file).map_err(|e| {
                    SetupError::io(format!("Error deleting file {}", file.display()), e)
                })?;
            }
            info!(log_path = %log_path.display(), files = files.len(), "Log files deleted");
        }
        Ok(())
    }

    async fn upgrade(&self, _ctx: &mut ConfigContext, config: &ConfUrl) -> Result<(), SetupError> {
        info!(%config, "Upgrade: nothing to do");
        Ok(())
    }

    async fn pre_upgrade(&self, _ctx: &mut ConfigContext, level: UpgradeLevel) -> Result<(), SetupError> {
        info!(%level, "Pre-upgrade: nothing to do");
        Ok(())
    }

    async fn post_upgrade(&self, _ctx: &mut ConfigContext, level: UpgradeLevel) -> Result<(), SetupError> {
        info!(%level, "Post-upgrade: nothing to do");
        Ok(())
    }
}
