//! Namespaced configuration store.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::ConfError;
use crate::key_path::KeyPath;
use crate::tree::ConfTree;
use crate::url::{ConfScheme, ConfUrl};

/// Hierarchical key-value store with named namespaces ("indexes").
///
/// Each index is bound to a source URL by `load` and is read and written by
/// key path. Changes stay in memory until `save`.
pub trait ConfStore: Send + Sync {
    /// Bind `index` to `url` and read it. With `skip_reload`, an index that is
    /// already loaded is left untouched; otherwise it is re-read from source.
    fn load(&mut self, index: &str, url: &ConfUrl, skip_reload: bool) -> Result<(), ConfError>;

    fn is_loaded(&self, index: &str) -> bool;

    /// Source URL the index was loaded from.
    fn source(&self, index: &str) -> Option<&ConfUrl>;

    /// Whole tree of a loaded index, for typed access.
    fn tree(&self, index: &str) -> Result<&ConfTree, ConfError>;

    fn get(&self, index: &str, key: &KeyPath) -> Result<Option<Value>, ConfError> {
        Ok(self.tree(index)?.get(key).cloned())
    }

    fn set(&mut self, index: &str, key: &KeyPath, value: Value) -> Result<(), ConfError>;

    fn delete(&mut self, index: &str, key: &KeyPath) -> Result<Option<Value>, ConfError>;

    /// Persist the index back to its source.
    fn save(&mut self, index: &str) -> Result<(), ConfError>;
}

struct LoadedIndex {
    url: ConfUrl,
    tree: ConfTree,
}

/// `ConfStore` backed by JSON documents on the local filesystem.
///
/// A source that does not exist yet loads as an empty document and is
/// created on first save.
#[derive(Default)]
pub struct JsonConfStore {
    indexes: HashMap<String, LoadedIndex>,
}

impl JsonConfStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_tree(url: &ConfUrl) -> Result<ConfTree, ConfError> {
        match url.scheme() {
            ConfScheme::Json => read_json(url.path()),
        }
    }

    fn index_mut(&mut self, index: &str) -> Result<&mut LoadedIndex, ConfError> {
        self.indexes
            .get_mut(index)
            .ok_or_else(|| ConfError::IndexNotLoaded {
                index: index.to_string(),
            })
    }
}

impl ConfStore for JsonConfStore {
    fn load(&mut self, index: &str, url: &ConfUrl, skip_reload: bool) -> Result<(), ConfError> {
        if skip_reload && self.indexes.contains_key(index) {
            debug!(index, %url, "Config index already loaded, skipping reload");
            return Ok(());
        }
        let tree = Self::read_tree(url)?;
        debug!(index, %url, "Config index loaded");
        self.indexes.insert(
            index.to_string(),
            LoadedIndex {
                url: url.clone(),
                tree,
            },
        );
        Ok(())
    }

    fn is_loaded(&self, index: &str) -> bool {
        self.indexes.contains_key(index)
    }

    fn source(&self, index: &str) -> Option<&ConfUrl> {
        self.indexes.get(index).map(|i| &i.url)
    }

    fn tree(&self, index: &str) -> Result<&ConfTree, ConfError> {
        self.indexes
            .get(index)
            .map(|i| &i.tree)
            .ok_or_else(|| ConfError::IndexNotLoaded {
                index: index.to_string(),
            })
    }

    fn set(&mut self, index: &str, key: &KeyPath, value: Value) -> Result<(), ConfError> {
        self.index_mut(index)?.tree.set(key, value);
        Ok(())
    }

    fn delete(&mut self, index: &str, key: &KeyPath) -> Result<Option<Value>, ConfError> {
        Ok(self.index_mut(index)?.tree.delete(key))
    }

    fn save(&mut self, index: &str) -> Result<(), ConfError> {
        let loaded = self.index_mut(index)?;
        match loaded.url.scheme() {
            ConfScheme::Json => write_json(loaded.url.path(), &loaded.tree)?,
        }
        debug!(index, url = %loaded.url, "Config index saved");
        Ok(())
    }
}

fn read_json(path: &Path) -> Result<ConfTree, ConfError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ConfTree::new()),
        Err(source) => {
            return Err(ConfError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if raw.trim().is_empty() {
        return Ok(ConfTree::new());
    }
    let value: Value = serde_json::from_str(&raw).map_err(|source| ConfError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    ConfTree::from_value(value).ok_or_else(|| ConfError::InvalidDocument {
        path: path.to_path_buf(),
    })
}

fn write_json(path: &Path, tree: &ConfTree) -> Result<(), ConfError> {
    let io_err = |source| ConfError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let body = serde_json::to_string_pretty(tree.as_value()).map_err(|source| ConfError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, body).map_err(io_err)
}
