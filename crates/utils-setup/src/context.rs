//! Per-invocation configuration context.
//!
//! Owns the configuration store and knows the two namespaces every phase
//! consults: the cluster config (storage paths) and the component conf
//! (`cortx.conf` of the utils component).

use std::fmt;
use std::path::{Path, PathBuf};

use shared_conf::{ConfError, ConfStore, ConfUrl, KeyPath, Value};
use tracing::debug;

use crate::domain::keys;
use crate::error::{SetupError, ValidationError};

/// Namespace of the cluster config.
pub const CLUSTER_INDEX: &str = "cluster_conf";
/// Namespace of the component conf.
pub const COMPONENT_INDEX: &str = "cortx_conf";

/// Local storage root used when the cluster config defines none.
pub const DEFAULT_LOCAL_STORAGE: &str = "/etc/cortx";
/// Log root used when neither the component conf nor the cluster config has one.
pub const DEFAULT_LOG_ROOT: &str = "/var/log";

/// Storage locations declared by the cluster config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Local,
    Log,
    Shared,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Log => "log",
            Self::Shared => "shared",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit replacement for a process-wide config accessor.
///
/// Built once per invocation and handed to every phase by `&mut`.
pub struct ConfigContext {
    store: Box<dyn ConfStore>,
    machine_id: String,
    cluster_url: ConfUrl,
    component_url: ConfUrl,
}

impl ConfigContext {
    /// Load the cluster config from `cluster_url`, then the component conf
    /// from `component_url` or, when `None`, from
    /// `<local storage>/utils/conf/cortx.conf`.
    pub fn new(
        mut store: Box<dyn ConfStore>,
        machine_id: impl Into<String>,
        cluster_url: ConfUrl,
        component_url: Option<ConfUrl>,
    ) -> Result<Self, SetupError> {
        store.load(CLUSTER_INDEX, &cluster_url, true)?;

        let component_url = match component_url {
            Some(url) => url,
            None => {
                let local = read_storage(store.as_ref(), StorageKind::Local)?
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_STORAGE));
                ConfUrl::json(local.join("utils/conf/cortx.conf"))
            }
        };
        store.load(COMPONENT_INDEX, &component_url, true)?;

        let machine_id = machine_id.into();
        debug!(%machine_id, cluster = %cluster_url, component = %component_url, "Config context ready");

        Ok(Self {
            store,
            machine_id,
            cluster_url,
            component_url,
        })
    }

    pub fn machine_id(&self) -> &str {
        &self.machine_id
    }

    pub fn cluster_url(&self) -> &ConfUrl {
        &self.cluster_url
    }

    pub fn component_url(&self) -> &ConfUrl {
        &self.component_url
    }

    /// Value at `key` in the component conf.
    pub fn get(&self, key: &str) -> Result<Option<Value>, SetupError> {
        Ok(self.store.get(COMPONENT_INDEX, &KeyPath::parse(key)?)?)
    }

    /// String at `key` in the component conf, `None` when absent.
    pub fn get_str(&self, key: &str) -> Result<Option<String>, SetupError> {
        let tree = self.store.tree(COMPONENT_INDEX)?;
        match tree.get_str(&KeyPath::parse(key)?) {
            Ok(s) => Ok(Some(s.to_string())),
            Err(ConfError::KeyNotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// String at `key` in the component conf; absence is a validation error
    /// naming the key and the component conf URL.
    pub fn require_str(&self, key: &str) -> Result<String, SetupError> {
        self.get_str(key)?.ok_or_else(|| {
            ValidationError::MissingKey {
                key: key.to_string(),
                source_url: self.component_url.to_string(),
            }
            .into()
        })
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), SetupError> {
        self.store
            .set(COMPONENT_INDEX, &KeyPath::parse(key)?, value.into())?;
        Ok(())
    }

    /// Persist the component conf.
    pub fn save(&mut self) -> Result<(), SetupError> {
        self.store.save(COMPONENT_INDEX)?;
        Ok(())
    }

    pub fn set_and_save(&mut self, key: &str, value: impl Into<Value>) -> Result<(), SetupError> {
        self.set(key, value)?;
        self.save()
    }

    /// Storage path of `kind` from the cluster config.
    pub fn storage_path(&self, kind: StorageKind) -> Result<Option<PathBuf>, SetupError> {
        read_storage(self.store.as_ref(), kind)
    }

    /// `<root>/utils/<machine_id>` where root is `base_dir`, else the
    /// component `log_dir`, else the log storage path, else `/var/log`.
    pub fn log_path(&self, base_dir: Option<&Path>) -> Result<PathBuf, SetupError> {
        let root = match base_dir {
            Some(base) => base.to_path_buf(),
            None => match self.get_str(keys::LOG_DIR)? {
                Some(dir) => PathBuf::from(dir),
                None => self
                    .storage_path(StorageKind::Log)?
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_ROOT)),
            },
        };
        Ok(root.join("utils").join(&self.machine_id))
    }

    pub fn store(&self) -> &dyn ConfStore {
        self.store.as_ref()
    }

    /// Namespace-level access for phases that load their own templates.
    pub fn store_mut(&mut self) -> &mut dyn ConfStore {
        self.store.as_mut()
    }
}

fn read_storage(store: &dyn ConfStore, kind: StorageKind) -> Result<Option<PathBuf>, SetupError> {
    let key = KeyPath::parse(&keys::storage(kind.as_str()))?;
    match store.tree(CLUSTER_INDEX)?.get_str(&key) {
        Ok(path) if !path.is_empty() => Ok(Some(PathBuf::from(path))),
        Ok(_) | Err(ConfError::KeyNotFound { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
