//! # Shared Conf - Hierarchical Configuration Store
//!
//! Key-value persistence for setup tooling. Values live in a JSON tree and are
//! addressed by `>`-delimited key paths such as `cortx>utils>message_bus_backend`.
//!
//! ## Layout
//!
//! ```text
//! ┌────────────────┐   load(index, url)   ┌──────────────────┐
//! │  ConfStore     │ ───────────────────→ │  json://<path>   │
//! │  (namespaces)  │ ←─────────────────── │  (file on disk)  │
//! └───────┬────────┘        save          └──────────────────┘
//!         │ get/set(KeyPath)
//!         ↓
//! ┌────────────────┐
//! │   ConfTree     │  typed accessors, explicit "not found"
//! └────────────────┘
//! ```
//!
//! A namespace ("index") binds a name to a loaded source. Several namespaces
//! may point to the same file; each keeps its own in-memory tree and only the
//! namespace that is saved writes back.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod key_path;
pub mod store;
pub mod tree;
pub mod url;

pub use error::ConfError;
pub use key_path::{KeyPath, Segment, KEY_DELIMITER};
pub use store::{ConfStore, JsonConfStore};
pub use tree::ConfTree;
pub use url::{ConfScheme, ConfUrl};

/// Re-exported so callers can build values without a direct `serde_json` dependency.
pub use serde_json::{json, Map, Value};
