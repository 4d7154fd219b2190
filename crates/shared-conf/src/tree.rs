//! Typed access over a generic configuration tree.

use serde_json::{Map, Value};

use crate::error::ConfError;
use crate::key_path::{KeyPath, Segment};

/// In-memory configuration document.
///
/// The root is always a JSON object. Lookups return `None` (or
/// `ConfError::KeyNotFound` from the typed accessors) when any segment of the
/// path is absent; no default value is ever substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfTree {
    root: Value,
}

impl Default for ConfTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfTree {
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Wrap an existing document. Returns `None` unless `value` is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        value.is_object().then_some(Self { root: value })
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    pub fn get(&self, key: &KeyPath) -> Option<&Value> {
        key.segments()
            .iter()
            .try_fold(&self.root, |node, seg| step(node, seg))
    }

    pub fn contains(&self, key: &KeyPath) -> bool {
        self.get(key).is_some()
    }

    /// String value at `key`.
    pub fn get_str(&self, key: &KeyPath) -> Result<&str, ConfError> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| mismatch(key, "string"))
    }

    /// List of strings at `key`. A single string is accepted as a one-element list.
    pub fn get_string_list(&self, key: &KeyPath) -> Result<Vec<String>, ConfError> {
        match self.require(key)? {
            Value::String(s) => Ok(vec![s.clone()]),
            Value::Array(items) => items
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| mismatch(key, "list of strings"))
                })
                .collect(),
            _ => Err(mismatch(key, "list of strings")),
        }
    }

    /// Map value at `key`.
    pub fn get_map(&self, key: &KeyPath) -> Result<&Map<String, Value>, ConfError> {
        self.require(key)?
            .as_object()
            .ok_or_else(|| mismatch(key, "map"))
    }

    /// Set `key` to `value`, creating intermediate maps (and list slots) as needed.
    /// Intermediate scalars in the way are replaced.
    pub fn set(&mut self, key: &KeyPath, value: impl Into<Value>) {
        let mut node = &mut self.root;
        for seg in key.segments() {
            let map = ensure_object(node);
            let slot = map.entry(seg.name().to_string()).or_insert(Value::Null);
            node = match seg.index() {
                None => slot,
                Some(idx) => {
                    let list = ensure_array(slot);
                    if list.len() <= idx {
                        list.resize(idx + 1, Value::Null);
                    }
                    &mut list[idx]
                }
            };
        }
        *node = value.into();
    }

    /// Remove `key`, returning the old value. List elements are removed and
    /// later elements shift down.
    pub fn delete(&mut self, key: &KeyPath) -> Option<Value> {
        let (parents, last) = key.split_last();
        let mut node = &mut self.root;
        for seg in parents {
            node = step_mut(node, seg)?;
        }
        let map = node.as_object_mut()?;
        match last.index() {
            None => map.remove(last.name()),
            Some(idx) => {
                let list = map.get_mut(last.name())?.as_array_mut()?;
                (idx < list.len()).then(|| list.remove(idx))
            }
        }
    }

    fn require(&self, key: &KeyPath) -> Result<&Value, ConfError> {
        self.get(key).ok_or_else(|| ConfError::KeyNotFound {
            key: key.to_string(),
        })
    }
}

fn step<'a>(node: &'a Value, seg: &Segment) -> Option<&'a Value> {
    let child = node.as_object()?.get(seg.name())?;
    match seg.index() {
        None => Some(child),
        Some(idx) => child.as_array()?.get(idx),
    }
}

fn step_mut<'a>(node: &'a mut Value, seg: &Segment) -> Option<&'a mut Value> {
    let child = node.as_object_mut()?.get_mut(seg.name())?;
    match seg.index() {
        None => Some(child),
        Some(idx) => child.as_array_mut()?.get_mut(idx),
    }
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced with an object"),
    }
}

fn ensure_array(node: &mut Value) -> &mut Vec<Value> {
    if !node.is_array() {
        *node = Value::Array(Vec::new());
    }
    match node {
        Value::Array(list) => list,
        _ => unreachable!("node was just replaced with an array"),
    }
}

fn mismatch(key: &KeyPath, expected: &'static str) -> ConfError {
    ConfError::TypeMismatch {
        key: key.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(s: &str) -> KeyPath {
        KeyPath::parse(s).unwrap()
    }

    fn sample() -> ConfTree {
        ConfTree::from_value(json!({
            "cortx": {
                "utils": { "message_bus_backend": "kafka" },
                "external": {
                    "kafka": { "endpoints": ["tcp://kafka-1:9092", "tcp://kafka-2:9092"] }
                }
            },
            "node": {
                "abc": { "hostname": "ssc-vm-1", "name": "srvnode-1" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_get_nested_values() {
        let tree = sample();
        assert_eq!(
            tree.get_str(&key("cortx>utils>message_bus_backend")).unwrap(),
            "kafka"
        );
        assert_eq!(
            tree.get_str(&key("cortx>external>kafka>endpoints[1]")).unwrap(),
            "tcp://kafka-2:9092"
        );
        assert!(tree.contains(&key("node>abc>name")));
    }

    #[test]
    fn test_missing_key_is_explicit() {
        let tree = sample();
        assert!(tree.get(&key("node>xyz>hostname")).is_none());
        assert!(tree.get(&key("cortx>external>kafka>endpoints[5]")).is_none());
        assert!(matches!(
            tree.get_str(&key("cortx>utils>missing")),
            Err(ConfError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_type_mismatch() {
        let tree = sample();
        assert!(matches!(
            tree.get_str(&key("cortx>utils")),
            Err(ConfError::TypeMismatch { expected: "string", .. })
        ));
        assert!(tree.get_map(&key("cortx>utils>message_bus_backend")).is_err());
    }

    #[test]
    fn test_string_list_accepts_scalar() {
        let mut tree = sample();
        assert_eq!(
            tree.get_string_list(&key("cortx>external>kafka>endpoints"))
                .unwrap()
                .len(),
            2
        );
        tree.set(&key("cortx>external>kafka>endpoints"), "tcp://solo:9092");
        assert_eq!(
            tree.get_string_list(&key("cortx>external>kafka>endpoints"))
                .unwrap(),
            vec!["tcp://solo:9092".to_string()]
        );
    }

    #[test]
    fn test_set_creates_intermediate_maps() {
        let mut tree = ConfTree::new();
        tree.set(&key("support>local_path"), "/var/log/cortx/support_bundle");
        tree.set(&key("cluster>srvnode-1"), "ssc-vm-1");
        assert_eq!(
            tree.as_value(),
            &json!({
                "support": { "local_path": "/var/log/cortx/support_bundle" },
                "cluster": { "srvnode-1": "ssc-vm-1" }
            })
        );
    }

    #[test]
    fn test_set_replaces_scalar_in_the_way() {
        let mut tree = ConfTree::new();
        tree.set(&key("log_dir"), "/var/log");
        tree.set(&key("log_dir>nested"), "x");
        assert_eq!(tree.get_str(&key("log_dir>nested")).unwrap(), "x");
    }

    #[test]
    fn test_set_list_slot() {
        let mut tree = ConfTree::new();
        tree.set(&key("a[2]"), "c");
        assert_eq!(tree.as_value(), &json!({ "a": [null, null, "c"] }));
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut tree = sample();
        tree.set(&key("cluster>srvnode-1"), "ssc-vm-1");
        let once = tree.clone();
        tree.set(&key("cluster>srvnode-1"), "ssc-vm-1");
        assert_eq!(tree, once);
    }

    #[test]
    fn test_delete() {
        let mut tree = sample();
        assert_eq!(
            tree.delete(&key("node>abc>hostname")),
            Some(json!("ssc-vm-1"))
        );
        assert!(!tree.contains(&key("node>abc>hostname")));
        assert_eq!(
            tree.delete(&key("cortx>external>kafka>endpoints[0]")),
            Some(json!("tcp://kafka-1:9092"))
        );
        assert_eq!(
            tree.get_str(&key("cortx>external>kafka>endpoints[0]")).unwrap(),
            "tcp://kafka-2:9092"
        );
        assert_eq!(tree.delete(&key("nope>nothing")), None);
    }

    #[test]
    fn test_from_value_requires_object() {
        assert!(ConfTree::from_value(json!([1, 2])).is_none());
        assert!(ConfTree::from_value(json!({})).is_some());
    }
}
